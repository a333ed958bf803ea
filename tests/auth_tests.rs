use actix_web::{App, http::StatusCode, test, web};
use pretty_assertions::assert_eq;
use serial_test::serial;

use tempo_be::handlers::auth;

mod common;

macro_rules! auth_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.app_state()))
                .app_data(web::Data::new($ctx.config.clone()))
                .service(
                    web::scope("/api/v1").service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    ),
                ),
        )
    };
}

#[actix_web::test]
#[serial]
async fn me_without_token_is_unauthorized() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = auth_app!(ctx).await;

    let req = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn me_with_expired_token_is_unauthorized() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = auth_app!(ctx).await;

    // A token signed with the right secret but already expired.
    let expired = {
        use chrono::Utc;
        use jsonwebtoken::{EncodingKey, Header, encode};
        use tempo_be::database::models::UserRole;
        use tempo_be::services::auth::Claims;
        use uuid::Uuid;

        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "expired@example.com".to_string(),
            organization_id: Uuid::new_v4(),
            role: UserRole::Employee,
            exp: (Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(ctx.config.jwt_secret.as_ref()),
        )
        .unwrap()
    };

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(common::auth_header(&expired))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn me_with_wrong_signature_is_unauthorized() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = auth_app!(ctx).await;

    let forged = {
        use chrono::Utc;
        use jsonwebtoken::{EncodingKey, Header, encode};
        use tempo_be::database::models::UserRole;
        use tempo_be::services::auth::Claims;
        use uuid::Uuid;

        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "forged@example.com".to_string(),
            organization_id: Uuid::new_v4(),
            role: UserRole::Admin,
            exp: (Utc::now() + chrono::Duration::hours(2)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap()
    };

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(common::auth_header(&forged))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn register_with_wrong_content_type_is_rejected() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = auth_app!(ctx).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .insert_header(("Content-Type", "text/plain"))
        .set_payload(common::MockData::register_body().to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[actix_web::test]
#[serial]
async fn register_with_malformed_body_is_bad_request() {
    common::setup_test_env();
    let ctx = common::TestContext::new().unwrap();
    let app = auth_app!(ctx).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"email": 42}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
