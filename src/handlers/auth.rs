use actix_web::{HttpResponse, web};

use crate::database::models::UserInfo;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::{Claims, LoginInput, RegisterInput};
use crate::AppState;

/// Register a new account, either founding an organization or joining
/// an existing one.
pub async fn register(
    state: web::Data<AppState>,
    input: web::Json<RegisterInput>,
) -> Result<HttpResponse, AppError> {
    match state.auth_service.register(input.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Created().json(ApiResponse::success(response))),
        Err(err) => {
            log::warn!("Registration failed: {}", err);
            Err(AppError::BadRequest(err.to_string()))
        }
    }
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    match state.auth_service.login(input.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(err) => {
            log::debug!("Login failed: {}", err);
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn me(
    claims: Claims,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .auth_service
        .current_user(&claims)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
}
