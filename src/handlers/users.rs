use actix_web::{HttpResponse, web};
use bcrypt::{DEFAULT_COST, hash};
use uuid::Uuid;

use crate::database::models::{
    CreateUserInput, UpdateComplianceSettingsInput, UpdateUserInput, UserInfo,
};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn create_user(
    claims: Claims,
    repo: web::Data<UserRepository>,
    input: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can create users".to_string(),
        ));
    }

    let input = input.into_inner();
    if repo.email_exists(&input.email).await? {
        return Err(AppError::BadRequest("Email already exists".to_string()));
    }

    let password_hash = hash(&input.password, DEFAULT_COST).map_err(anyhow::Error::from)?;
    let user = repo
        .create(claims.organization_id, password_hash, input)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(user)))
}

pub async fn get_users(
    claims: Claims,
    repo: web::Data<UserRepository>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to list users".to_string(),
        ));
    }

    let users = repo.list(claims.organization_id).await?;
    let users: Vec<UserInfo> = users.into_iter().map(UserInfo::from).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

pub async fn get_user(
    claims: Claims,
    repo: web::Data<UserRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if !claims.is_manager_or_admin() && user_id != claims.sub {
        return Err(AppError::PermissionDenied(
            "Cannot view other users".to_string(),
        ));
    }

    let user = repo
        .find_in_organization(claims.organization_id, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

pub async fn update_user(
    claims: Claims,
    repo: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateUserInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can update users".to_string(),
        ));
    }

    let user = repo
        .update(claims.organization_id, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

pub async fn delete_user(
    claims: Claims,
    repo: web::Data<UserRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can delete users".to_string(),
        ));
    }

    let user_id = path.into_inner();
    if user_id == claims.sub {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    repo.soft_delete(claims.organization_id, user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

// Compliance settings

pub async fn get_compliance_settings(
    claims: Claims,
    repo: web::Data<UserRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if !claims.is_manager_or_admin() && user_id != claims.sub {
        return Err(AppError::PermissionDenied(
            "Cannot view other users' compliance settings".to_string(),
        ));
    }

    repo.find_in_organization(claims.organization_id, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let settings = repo
        .compliance_settings(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Compliance settings not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(settings)))
}

pub async fn update_compliance_settings(
    claims: Claims,
    repo: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateComplianceSettingsInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can update compliance settings".to_string(),
        ));
    }

    let user_id = path.into_inner();
    repo.find_in_organization(claims.organization_id, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let settings = repo
        .update_compliance_settings(user_id, input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(settings)))
}
