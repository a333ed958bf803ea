use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{ProjectInput, ProjectStatus, TaskInput};
use crate::database::repositories::ProjectRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<String>,
}

pub async fn create_project(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    input: web::Json<ProjectInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to create projects".to_string(),
        ));
    }

    let project = repo.create(claims.organization_id, input.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(project)))
}

pub async fn get_projects(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    query: web::Query<ProjectQuery>,
) -> Result<HttpResponse, AppError> {
    let status_filter = match &query.status {
        Some(raw) => Some(raw.parse::<ProjectStatus>().map_err(AppError::BadRequest)?),
        None => None,
    };

    let projects = repo.list(claims.organization_id, status_filter).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(projects)))
}

pub async fn get_project(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let project = repo
        .find_by_id(claims.organization_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(project)))
}

pub async fn update_project(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    path: web::Path<Uuid>,
    input: web::Json<ProjectInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to update projects".to_string(),
        ));
    }

    let project = repo
        .update(claims.organization_id, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(project)))
}

pub async fn delete_project(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can delete projects".to_string(),
        ));
    }

    repo.soft_delete(claims.organization_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

// Tasks

pub async fn create_task(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    path: web::Path<Uuid>,
    input: web::Json<TaskInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to create tasks".to_string(),
        ));
    }

    let project_id = path.into_inner();
    repo.find_by_id(claims.organization_id, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    let task = repo
        .create_task(claims.organization_id, project_id, input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(task)))
}

pub async fn get_tasks(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    repo.find_by_id(claims.organization_id, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    let tasks = repo.list_tasks(claims.organization_id, project_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(tasks)))
}

pub async fn get_task(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let task = repo
        .find_task(claims.organization_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Task not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(task)))
}

pub async fn update_task(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    path: web::Path<Uuid>,
    input: web::Json<TaskInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to update tasks".to_string(),
        ));
    }

    let task = repo
        .update_task(claims.organization_id, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(task)))
}

pub async fn delete_task(
    claims: Claims,
    repo: web::Data<ProjectRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to delete tasks".to_string(),
        ));
    }

    repo.soft_delete_task(claims.organization_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
