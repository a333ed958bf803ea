use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::macros::string_enum;

/// Fields a modification request may touch. Everything else is rejected
/// up front; clock/billing fields trigger a recompute when applied.
pub const MODIFIABLE_FIELDS: &[&str] = &[
    "clock_in",
    "clock_out",
    "description",
    "is_billable",
    "hourly_rate",
    "project_id",
    "task_id",
];

pub const COMPUTATION_FIELDS: &[&str] = &["clock_in", "clock_out", "is_billable", "hourly_rate"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeModificationRequest {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub time_entry_id: Uuid,
    pub requested_by: Uuid,
    pub requested_changes: Value,
    pub reason: String,
    pub status: ModificationStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum ModificationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl ModificationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ModificationStatus::Pending)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationRequestInput {
    pub requested_changes: Value,
    pub reason: String,
}
