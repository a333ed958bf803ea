use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use crate::database::models::TimesheetPeriodInput;
use crate::database::repositories::{TimeEntryRepository, TimesheetRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn create_period(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    input: web::Json<TimesheetPeriodInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can create timesheet periods".to_string(),
        ));
    }

    let input = input.into_inner();
    if input.end_date < input.start_date {
        return Err(AppError::BadRequest(
            "Period end date must not be before its start date".to_string(),
        ));
    }

    let period = repo.create(claims.organization_id, input).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(period)))
}

pub async fn get_periods(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::PermissionDenied(
            "Insufficient permissions to list timesheet periods".to_string(),
        ));
    }

    let periods = repo.list(claims.organization_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(periods)))
}

pub async fn get_period(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let period = repo
        .find_by_id(claims.organization_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Timesheet period not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(period)))
}

/// Close a period, computing its totals from the entries inside it.
pub async fn close_period(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    entries: web::Data<TimeEntryRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can close timesheet periods".to_string(),
        ));
    }

    let period_id = path.into_inner();
    let period = repo
        .find_by_id(claims.organization_id, period_id)
        .await?
        .ok_or_else(|| AppError::not_found("Timesheet period not found"))?;

    if !period.is_open {
        return Err(AppError::BadRequest("Period is already closed".to_string()));
    }

    let (total_hours, billable_hours) = entries
        .totals_between(claims.organization_id, period.start_date, period.end_date)
        .await?;

    let period = repo
        .close(
            claims.organization_id,
            period_id,
            total_hours,
            billable_hours,
            Some(claims.sub),
            Utc::now(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(period)))
}

/// Lock a period and every time entry inside it.
pub async fn lock_period(
    claims: Claims,
    repo: web::Data<TimesheetRepository>,
    entries: web::Data<TimeEntryRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::PermissionDenied(
            "Only admins can lock timesheet periods".to_string(),
        ));
    }

    let period_id = path.into_inner();
    let period = repo
        .find_by_id(claims.organization_id, period_id)
        .await?
        .ok_or_else(|| AppError::not_found("Timesheet period not found"))?;

    let locked = entries
        .lock_entries_between(claims.organization_id, period.start_date, period.end_date)
        .await?;
    let period = repo.lock(claims.organization_id, period_id).await?;

    log::info!(
        "Locked timesheet period {} ({} entries)",
        period.id,
        locked
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(period)))
}
