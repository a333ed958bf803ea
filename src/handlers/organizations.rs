use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::database::models::{
    DepartmentInput, UpdateOrganizationInput, UpdateOrganizationSettingsInput,
};
use crate::database::repositories::OrganizationRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Admin role required".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_organization(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
) -> Result<HttpResponse, AppError> {
    let organization = repo
        .find_by_id(claims.organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(organization)))
}

pub async fn update_organization(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
    input: web::Json<UpdateOrganizationInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    let organization = repo
        .update(claims.organization_id, input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(organization)))
}

pub async fn delete_organization(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    repo.soft_delete(claims.organization_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_organization_settings(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
) -> Result<HttpResponse, AppError> {
    let settings = repo
        .settings(claims.organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization settings not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(settings)))
}

pub async fn update_organization_settings(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
    input: web::Json<UpdateOrganizationSettingsInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    let settings = repo
        .update_settings(claims.organization_id, input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(settings)))
}

// Departments

pub async fn create_department(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
    input: web::Json<DepartmentInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    let department = repo
        .create_department(claims.organization_id, input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(department)))
}

pub async fn get_departments(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
) -> Result<HttpResponse, AppError> {
    let departments = repo.list_departments(claims.organization_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(departments)))
}

pub async fn get_department(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let department = repo
        .find_department(claims.organization_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Department not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(department)))
}

pub async fn update_department(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
    path: web::Path<Uuid>,
    input: web::Json<DepartmentInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    let department = repo
        .update_department(claims.organization_id, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(department)))
}

pub async fn delete_department(
    claims: Claims,
    repo: web::Data<OrganizationRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&claims)?;

    repo.soft_delete_department(claims.organization_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
