use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub permissions: Vec<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub hourly_rate: Option<BigDecimal>, // NUMERIC(8,2)
    pub is_active: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Per-user overrides for the organization-level thresholds. The
/// calculator prefers these over the organization settings when present.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub max_hours_per_day: i32,
    pub max_hours_per_week: i32,
    pub overtime_rate_multiplier: BigDecimal, // NUMERIC(4,2)
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum UserRole {
        Employee => "employee",
        Contractor => "contractor",
        TeamLead => "team_lead",
        Manager => "manager",
        Admin => "admin",
        GlobalAdmin => "global_admin",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Employee
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<UserRole>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub hourly_rate: Option<BigDecimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub hourly_rate: Option<BigDecimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplianceSettingsInput {
    pub max_hours_per_day: Option<i32>,
    pub max_hours_per_week: Option<i32>,
    pub overtime_rate_multiplier: Option<BigDecimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            organization_id: user.organization_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
        }
    }
}
