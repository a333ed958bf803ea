use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{
    ApprovalStatus, ClockInInput, ReviewInput, StartBreakInput, UpdateTimeEntryInput,
};
use crate::database::repositories::{TimeEntryRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::require_actor;
use crate::handlers::shared::ApiResponse;
use crate::services::TimeClockService;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub user_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

/// List time entries. Employees only see their own; managers and admins
/// may filter by user.
pub async fn list_time_entries(
    claims: Claims,
    repo: web::Data<TimeEntryRepository>,
    query: web::Query<TimeEntryQuery>,
) -> Result<HttpResponse, AppError> {
    let user_filter = if claims.is_manager_or_admin() {
        query.user_id
    } else {
        Some(claims.sub)
    };

    let status_filter = match &query.status {
        Some(raw) => Some(
            raw.parse::<ApprovalStatus>()
                .map_err(AppError::BadRequest)?,
        ),
        None => None,
    };

    let entries = repo
        .list(
            claims.organization_id,
            user_filter,
            status_filter,
            query.date_from,
            query.date_to,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}

pub async fn get_time_entry(
    claims: Claims,
    repo: web::Data<TimeEntryRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let entry = repo
        .find_by_id(claims.organization_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Time entry not found"))?;

    if !claims.is_manager_or_admin() && entry.user_id != claims.sub {
        return Err(AppError::PermissionDenied(
            "Cannot view other users' time entries".to_string(),
        ));
    }

    let breaks = repo.breaks_for_entry(entry.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "entry": entry,
        "breaks": breaks,
    }))))
}

pub async fn update_time_entry(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateTimeEntryInput>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let entry = timeclock
        .update_entry(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

pub async fn delete_time_entry(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    timeclock.delete_entry(&actor, path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

// Clock operations

pub async fn clock_in(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    input: web::Json<ClockInInput>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let entry = timeclock.clock_in(&actor, input.into_inner()).await?;

    log::info!("User {} clocked in (entry {})", actor.id, entry.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(entry)))
}

pub async fn clock_out(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let entry = timeclock.clock_out(&actor).await?;

    log::info!(
        "User {} clocked out (entry {}, {} hours)",
        actor.id,
        entry.id,
        entry.total_hours
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

pub async fn current_time_entry(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;

    match timeclock.current_entry(&actor).await? {
        Some((entry, breaks)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
                "activeEntry": entry,
                "breaks": breaks,
            }))))
        }
        None => Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
            "activeEntry": null,
        })))),
    }
}

// Breaks

pub async fn start_break(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
    input: web::Json<StartBreakInput>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let break_entry = timeclock
        .start_break(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(break_entry)))
}

pub async fn end_break(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let break_entry = timeclock.end_break(&actor, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(break_entry)))
}

// Approval workflow

pub async fn submit_time_entry(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let entry = timeclock.submit(&actor, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

pub async fn approve_time_entry(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
    input: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let entry = timeclock
        .approve(&actor, path.into_inner(), input.into_inner().notes)
        .await?;

    log::info!("Entry {} approved by {}", entry.id, actor.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

pub async fn reject_time_entry(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
    input: web::Json<ReviewInput>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let entry = timeclock
        .reject(&actor, path.into_inner(), input.into_inner().notes)
        .await?;

    log::info!("Entry {} rejected by {}", entry.id, actor.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

pub async fn reset_time_entry(
    claims: Claims,
    users: web::Data<UserRepository>,
    timeclock: web::Data<TimeClockService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = require_actor(&claims, &users).await?;
    let entry = timeclock.reset_to_draft(&actor, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(entry)))
}

// Summaries

pub async fn time_summary(
    claims: Claims,
    repo: web::Data<TimeEntryRepository>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = if claims.is_manager_or_admin() {
        query.user_id.unwrap_or(claims.sub)
    } else {
        claims.sub
    };
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let summary = repo
        .daily_summary(claims.organization_id, user_id, date)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}
