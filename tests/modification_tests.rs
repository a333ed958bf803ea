use actix_web::{App, http::StatusCode, test, web};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

use tempo_be::database::models::UserRole;
use tempo_be::database::repositories::{ModificationRepository, UserRepository};
use tempo_be::handlers::modifications;

mod common;

macro_rules! modification_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.app_state()))
                .app_data(web::Data::new(UserRepository::new($ctx.pool.clone())))
                .app_data(web::Data::new(ModificationRepository::new(
                    $ctx.pool.clone(),
                )))
                .app_data(web::Data::new($ctx.timeclock()))
                .app_data(web::Data::new($ctx.config.clone()))
                .service(
                    web::scope("/api/v1").service(
                        web::scope("/modification-requests")
                            .route(
                                "",
                                web::get().to(modifications::list_modification_requests),
                            )
                            .route(
                                "/{id}/approve",
                                web::post().to(modifications::approve_modification_request),
                            ),
                    ),
                ),
        )
    };
}

#[actix_web::test]
#[serial]
async fn create_request_without_token_is_unauthorized() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(UserRepository::new(ctx.pool.clone())))
            .app_data(web::Data::new(ctx.timeclock()))
            .app_data(web::Data::new(ctx.config.clone()))
            .service(web::scope("/api/v1").service(web::scope("/time-entries").route(
                "/{id}/modifications",
                web::post().to(modifications::create_modification_request),
            ))),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/time-entries/{}/modifications",
            Uuid::new_v4()
        ))
        .set_json(common::MockData::modification_body())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn list_requests_without_token_is_unauthorized() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = modification_app!(ctx).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/modification-requests")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn employees_cannot_list_modification_requests() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = modification_app!(ctx).await;

    let token = ctx.token_for(UserRole::Employee);
    let req = test::TestRequest::get()
        .uri("/api/v1/modification-requests")
        .insert_header(common::auth_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
async fn list_requests_with_invalid_status_is_bad_request() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = modification_app!(ctx).await;

    let token = ctx.token_for(UserRole::Manager);
    let req = test::TestRequest::get()
        .uri("/api/v1/modification-requests?status=undecided")
        .insert_header(common::auth_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn approve_with_malformed_body_is_bad_request() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = modification_app!(ctx).await;

    let token = ctx.token_for(UserRole::Manager);
    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/modification-requests/{}/approve",
            Uuid::new_v4()
        ))
        .insert_header(common::auth_header(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_json(&json!({"notes": 17}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
