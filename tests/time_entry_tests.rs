use actix_web::{App, http::StatusCode, test, web};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

use tempo_be::database::models::UserRole;
use tempo_be::database::repositories::{TimeEntryRepository, UserRepository};
use tempo_be::handlers::time_entries;

mod common;

macro_rules! time_entry_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.app_state()))
                .app_data(web::Data::new(UserRepository::new($ctx.pool.clone())))
                .app_data(web::Data::new(TimeEntryRepository::new($ctx.pool.clone())))
                .app_data(web::Data::new($ctx.timeclock()))
                .app_data(web::Data::new($ctx.config.clone()))
                .service(
                    web::scope("/api/v1").service(
                        web::scope("/time-entries")
                            .route("", web::get().to(time_entries::list_time_entries))
                            .route("/clock-in", web::post().to(time_entries::clock_in))
                            .route("/clock-out", web::post().to(time_entries::clock_out))
                            .route("/{id}", web::get().to(time_entries::get_time_entry))
                            .route(
                                "/{id}/submit",
                                web::post().to(time_entries::submit_time_entry),
                            )
                            .route(
                                "/{id}/approve",
                                web::post().to(time_entries::approve_time_entry),
                            )
                            .route(
                                "/{id}/breaks/start",
                                web::post().to(time_entries::start_break),
                            ),
                    ),
                ),
        )
    };
}

#[actix_web::test]
#[serial]
async fn clock_in_without_token_is_unauthorized() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = time_entry_app!(ctx).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/time-entries/clock-in")
        .set_json(&json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn clock_out_without_token_is_unauthorized() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = time_entry_app!(ctx).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/time-entries/clock-out")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn list_with_garbage_token_is_unauthorized() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = time_entry_app!(ctx).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/time-entries")
        .insert_header(("Authorization", "Bearer not-a-real-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn list_with_invalid_status_filter_is_bad_request() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = time_entry_app!(ctx).await;

    // Status parsing happens before any repository call, so this needs
    // no database.
    let token = ctx.token_for(UserRole::Admin);
    let req = test::TestRequest::get()
        .uri("/api/v1/time-entries?status=definitely-wrong")
        .insert_header(common::auth_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn entry_routes_reject_non_uuid_ids() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = time_entry_app!(ctx).await;

    let token = ctx.token_for(UserRole::Employee);
    let req = test::TestRequest::post()
        .uri("/api/v1/time-entries/not-a-uuid/submit")
        .insert_header(common::auth_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Path extraction fails before the handler body runs.
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn approve_with_malformed_body_is_bad_request() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = time_entry_app!(ctx).await;

    let token = ctx.token_for(UserRole::Manager);
    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/time-entries/{}/approve",
            uuid::Uuid::new_v4()
        ))
        .insert_header(common::auth_header(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not valid json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
