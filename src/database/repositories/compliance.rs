use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{AlertType, ComplianceAlert, NewComplianceAlert};

#[derive(Clone)]
pub struct ComplianceRepository {
    pool: PgPool,
}

impl ComplianceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, alert: NewComplianceAlert) -> Result<ComplianceAlert> {
        let created = sqlx::query_as::<_, ComplianceAlert>(
            r#"
            INSERT INTO
                compliance_alerts (
                    id, organization_id, user_id, time_entry_id, alert_type, severity,
                    message, threshold_value, actual_value, created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(alert.organization_id)
        .bind(alert.user_id)
        .bind(alert.time_entry_id)
        .bind(alert.alert_type)
        .bind(alert.severity)
        .bind(&alert.message)
        .bind(&alert.threshold_value)
        .bind(&alert.actual_value)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ComplianceAlert>> {
        let alert = sqlx::query_as::<_, ComplianceAlert>(
            "SELECT * FROM compliance_alerts WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(alert)
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        user_id: Option<Uuid>,
        unresolved_only: bool,
    ) -> Result<Vec<ComplianceAlert>> {
        let alerts = sqlx::query_as::<_, ComplianceAlert>(
            r#"
            SELECT * FROM compliance_alerts
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3 = FALSE OR is_resolved = FALSE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(unresolved_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// The sweeps call this to avoid re-raising the same open alert on
    /// every run.
    pub async fn has_open_alert(
        &self,
        user_id: Uuid,
        alert_type: AlertType,
        time_entry_id: Option<Uuid>,
    ) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM compliance_alerts
            WHERE user_id = $1 AND alert_type = $2
              AND ($3::uuid IS NULL OR time_entry_id = $3)
              AND is_resolved = FALSE
            "#,
        )
        .bind(user_id)
        .bind(alert_type)
        .bind(time_entry_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0 > 0)
    }

    pub async fn acknowledge(
        &self,
        organization_id: Uuid,
        id: Uuid,
        acknowledged_by: Uuid,
    ) -> Result<ComplianceAlert> {
        let alert = sqlx::query_as::<_, ComplianceAlert>(
            r#"
            UPDATE compliance_alerts
            SET is_acknowledged = TRUE, acknowledged_by = $1, acknowledged_at = $2, updated_at = $2
            WHERE id = $3 AND organization_id = $4
            RETURNING *
            "#,
        )
        .bind(acknowledged_by)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(alert)
    }

    pub async fn resolve(
        &self,
        organization_id: Uuid,
        id: Uuid,
        resolution_notes: Option<String>,
    ) -> Result<ComplianceAlert> {
        let alert = sqlx::query_as::<_, ComplianceAlert>(
            r#"
            UPDATE compliance_alerts
            SET is_resolved = TRUE, resolution_notes = $1, updated_at = $2
            WHERE id = $3 AND organization_id = $4
            RETURNING *
            "#,
        )
        .bind(resolution_notes)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(alert)
    }
}
