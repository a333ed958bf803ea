use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::ResolveAlertInput;
use crate::database::repositories::ComplianceRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub user_id: Option<Uuid>,
    pub unresolved_only: Option<bool>,
}

/// List compliance alerts. Employees see their own; managers and admins
/// see the whole organization.
pub async fn get_alerts(
    claims: Claims,
    repo: web::Data<ComplianceRepository>,
    query: web::Query<AlertQuery>,
) -> Result<HttpResponse, AppError> {
    let user_filter = if claims.is_manager_or_admin() {
        query.user_id
    } else {
        Some(claims.sub)
    };

    let alerts = repo
        .list(
            claims.organization_id,
            user_filter,
            query.unresolved_only.unwrap_or(false),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(alerts)))
}

pub async fn get_alert(
    claims: Claims,
    repo: web::Data<ComplianceRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let alert = repo
        .find_by_id(claims.organization_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Compliance alert not found"))?;

    if !claims.is_manager_or_admin() && alert.user_id != claims.sub {
        return Err(AppError::PermissionDenied(
            "Cannot view other users' alerts".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}

pub async fn acknowledge_alert(
    claims: Claims,
    repo: web::Data<ComplianceRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let alert_id = path.into_inner();
    let alert = repo
        .find_by_id(claims.organization_id, alert_id)
        .await?
        .ok_or_else(|| AppError::not_found("Compliance alert not found"))?;

    if !claims.is_manager_or_admin() && alert.user_id != claims.sub {
        return Err(AppError::PermissionDenied(
            "Cannot acknowledge other users' alerts".to_string(),
        ));
    }

    let alert = repo
        .acknowledge(claims.organization_id, alert_id, claims.sub)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}

pub async fn resolve_alert(
    claims: Claims,
    repo: web::Data<ComplianceRepository>,
    path: web::Path<Uuid>,
    input: web::Json<ResolveAlertInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to resolve alerts".to_string(),
        ));
    }

    let alert_id = path.into_inner();
    repo.find_by_id(claims.organization_id, alert_id)
        .await?
        .ok_or_else(|| AppError::not_found("Compliance alert not found"))?;

    let alert = repo
        .resolve(
            claims.organization_id,
            alert_id,
            input.into_inner().resolution_notes,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(alert)))
}
