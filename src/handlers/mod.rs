pub mod auth;
pub mod compliance;
pub mod modifications;
pub mod organizations;
pub mod projects;
pub mod shared;
pub mod teams;
pub mod time_entries;
pub mod timesheets;
pub mod users;

use crate::database::models::User;
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::services::auth::Claims;

/// Resolve the calling user from their claims. Deactivated and deleted
/// accounts fail closed even if their token is still valid.
pub async fn require_actor(claims: &Claims, users: &UserRepository) -> Result<User, AppError> {
    users
        .find_by_id(claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)
}
