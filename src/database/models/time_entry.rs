use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,

    // Derived fields, recomputed on every mutation. Never authoritative.
    pub regular_hours: BigDecimal,   // NUMERIC(5,2)
    pub overtime_hours: BigDecimal,  // NUMERIC(5,2)
    pub total_hours: BigDecimal,     // NUMERIC(5,2)
    pub break_hours: BigDecimal,     // NUMERIC(5,2)

    pub is_billable: bool,
    pub hourly_rate: Option<BigDecimal>,   // NUMERIC(8,2)
    pub billable_amount: BigDecimal,       // NUMERIC(10,2)

    pub description: Option<String>,

    pub status: ApprovalStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_notes: Option<String>,
    pub is_locked: bool,

    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Clocked in but not yet out.
    pub fn is_active(&self) -> bool {
        self.clock_out.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BreakEntry {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub time_entry_id: Uuid,
    pub break_type: BreakType,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    // Derived from the interval when the break is closed, unless supplied.
    pub duration_minutes: Option<i32>,
    pub is_paid: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BreakEntry {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum BreakType {
        ShortBreak => "short_break",
        Lunch => "lunch",
        Personal => "personal",
        Meeting => "meeting",
        Other => "other",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum ApprovalStatus {
        Draft => "draft",
        Submitted => "submitted",
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl ApprovalStatus {
    /// submit() is only legal from draft.
    pub fn can_submit(&self) -> bool {
        matches!(self, ApprovalStatus::Draft)
    }

    /// approve()/reject() are legal from submitted and from the
    /// manager-queue sub-state pending.
    pub fn can_review(&self) -> bool {
        matches!(self, ApprovalStatus::Submitted | ApprovalStatus::Pending)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInInput {
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_billable: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBreakInput {
    pub break_type: Option<BreakType>,
    pub is_paid: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeEntryInput {
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_billable: Option<bool>,
    pub hourly_rate: Option<BigDecimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub notes: Option<String>,
}

/// Per-user/day rollup returned by the summary endpoint and logged by the
/// daily-summary sweep.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_hours: BigDecimal,
    pub overtime_hours: BigDecimal,
    pub billable_amount: BigDecimal,
    pub entry_count: i64,
}
