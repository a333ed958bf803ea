use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{ModificationRequestInput, ModificationStatus, ReviewInput};
use crate::database::repositories::{ModificationRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::require_actor;
use crate::handlers::shared::ApiResponse;
use crate::services::TimeClockService;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationQuery {
    pub time_entry_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Propose field-level changes to a submitted or approved entry.
pub async fn create_modification_request(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
    input: web::Json<ModificationRequestInput>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let request = timeclock
        .request_modification(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

pub async fn list_modification_requests(
    claims: Claims,
    repo: web::Data<ModificationRepository>,
    query: web::Query<ModificationQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to list modification requests".to_string(),
        ));
    }

    let status_filter = match &query.status {
        Some(raw) => Some(
            raw.parse::<ModificationStatus>()
                .map_err(AppError::BadRequest)?,
        ),
        None => None,
    };

    let requests = repo
        .list(claims.organization_id, query.time_entry_id, status_filter)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn get_modification_request(
    claims: Claims,
    repo: web::Data<ModificationRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = repo
        .find_by_id(claims.organization_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Modification request not found"))?;

    if !claims.is_manager_or_admin() && request.requested_by != claims.sub {
        return Err(AppError::PermissionDenied(
            "Cannot view other users' modification requests".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Approve a request: applies the proposed changes onto the entry and
/// recomputes its totals when needed.
pub async fn approve_modification_request(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
    input: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let request = timeclock
        .approve_modification(&actor, path.into_inner(), input.into_inner().notes)
        .await?;

    log::info!("Modification request {} approved by {}", request.id, actor.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn reject_modification_request(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
    input: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let request = timeclock
        .reject_modification(&actor, path.into_inner(), input.into_inner().notes)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}
