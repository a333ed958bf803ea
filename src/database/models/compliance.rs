use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAlert {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub time_entry_id: Option<Uuid>,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub threshold_value: Option<BigDecimal>, // NUMERIC(8,2)
    pub actual_value: Option<BigDecimal>,    // NUMERIC(8,2)
    pub is_acknowledged: bool,
    pub acknowledged_by: Option<Uuid>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub is_resolved: bool,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AlertType {
        Overtime => "overtime",
        LongShift => "long_shift",
        MissingClockout => "missing_clockout",
        ConsecutiveDays => "consecutive_days",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AlertSeverity {
        Info => "info",
        Warning => "warning",
        Critical => "critical",
    }
}

#[derive(Debug, Clone)]
pub struct NewComplianceAlert {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub time_entry_id: Option<Uuid>,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub threshold_value: Option<BigDecimal>,
    pub actual_value: Option<BigDecimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAlertInput {
    pub resolution_notes: Option<String>,
}
