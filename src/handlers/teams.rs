use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::database::models::{TeamInput, UserInfo};
use crate::database::repositories::TeamRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn create_team(
    claims: Claims,
    repo: web::Data<TeamRepository>,
    input: web::Json<TeamInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to create teams".to_string(),
        ));
    }

    let team = repo.create(claims.organization_id, input.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(team)))
}

pub async fn get_teams(
    claims: Claims,
    repo: web::Data<TeamRepository>,
) -> Result<HttpResponse, AppError> {
    let teams = repo.list(claims.organization_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(teams)))
}

pub async fn get_team(
    claims: Claims,
    repo: web::Data<TeamRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let team = repo
        .find_by_id(claims.organization_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(team)))
}

pub async fn update_team(
    claims: Claims,
    repo: web::Data<TeamRepository>,
    path: web::Path<Uuid>,
    input: web::Json<TeamInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to update teams".to_string(),
        ));
    }

    let team = repo
        .update(claims.organization_id, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(team)))
}

pub async fn delete_team(
    claims: Claims,
    repo: web::Data<TeamRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can delete teams".to_string(),
        ));
    }

    repo.soft_delete(claims.organization_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn add_team_member(
    claims: Claims,
    repo: web::Data<TeamRepository>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to manage team members".to_string(),
        ));
    }

    let (team_id, user_id) = path.into_inner();
    repo.find_by_id(claims.organization_id, team_id)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    let member = repo.add_member(team_id, user_id).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(member)))
}

pub async fn remove_team_member(
    claims: Claims,
    repo: web::Data<TeamRepository>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to manage team members".to_string(),
        ));
    }

    let (team_id, user_id) = path.into_inner();
    repo.find_by_id(claims.organization_id, team_id)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    repo.remove_member(team_id, user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_team_members(
    claims: Claims,
    repo: web::Data<TeamRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let team_id = path.into_inner();
    repo.find_by_id(claims.organization_id, team_id)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    let members = repo.members(team_id).await?;
    let members: Vec<UserInfo> = members.into_iter().map(UserInfo::from).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(members)))
}
