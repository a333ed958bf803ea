use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Clock-out must not be before clock-in")]
    InvalidInterval,

    #[error("An active time entry already exists")]
    AlreadyActive,

    #[error("No active time entry found")]
    NoActiveEntry,

    #[error("A break is already active for this time entry")]
    BreakAlreadyActive,

    #[error("No active break found for this time entry")]
    NoActiveBreak,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_)
            | AppError::InvalidInterval
            | AppError::AlreadyActive
            | AppError::NoActiveEntry
            | AppError::BreakAlreadyActive
            | AppError::NoActiveBreak
            | AppError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!("Request failed with status {}: {}", status_code, error_message);
        } else {
            log::debug!("Request rejected with status {}: {}", status_code, error_message);
        }

        HttpResponse::build(status_code).json(ApiResponse::<()>::error(&error_message))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Keep sqlx errors distinguishable when they bubble up through anyhow
        match error.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => AppError::DatabaseError(sqlx_err),
            Err(other) => {
                log::error!("Internal error: {}", other);
                AppError::InternalServerError(Some(other.to_string()))
            }
        }
    }
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(entity.to_string())
    }

    pub fn invalid_transition(from: impl std::fmt::Display, action: &str) -> Self {
        AppError::InvalidTransition(format!("cannot {} from status '{}'", action, from))
    }
}
