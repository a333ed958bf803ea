use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub timezone: String,
    pub currency: String,
    pub status: OrganizationStatus,
    pub is_active: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-organization knobs the time-entry calculator and the background
/// sweeps read. One row per organization, created together with it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettings {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub work_hours_per_day: i32,
    pub overtime_threshold_daily: i32,
    pub overtime_threshold_weekly: i32,
    pub overtime_rate_multiplier: BigDecimal, // NUMERIC(4,2)
    pub max_daily_hours: i32,
    pub require_time_approval: bool,
    pub auto_stop_after_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub parent_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub enum OrganizationStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationInput {
    pub name: String,
    pub slug: String,
    pub email: String,
    pub timezone: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationSettingsInput {
    pub work_hours_per_day: Option<i32>,
    pub overtime_threshold_daily: Option<i32>,
    pub overtime_threshold_weekly: Option<i32>,
    pub overtime_rate_multiplier: Option<BigDecimal>,
    pub max_daily_hours: Option<i32>,
    pub require_time_approval: Option<bool>,
    pub auto_stop_after_hours: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInput {
    pub name: String,
    pub code: Option<String>,
    pub parent_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
}
