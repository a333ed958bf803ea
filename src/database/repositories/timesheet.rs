use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{TimesheetPeriod, TimesheetPeriodInput};

#[derive(Clone)]
pub struct TimesheetRepository {
    pool: PgPool,
}

impl TimesheetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        input: TimesheetPeriodInput,
    ) -> Result<TimesheetPeriod> {
        let period = sqlx::query_as::<_, TimesheetPeriod>(
            r#"
            INSERT INTO
                timesheet_periods (id, organization_id, name, start_date, end_date, is_open, is_locked, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, TRUE, FALSE, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&input.name)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(period)
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TimesheetPeriod>> {
        let period = sqlx::query_as::<_, TimesheetPeriod>(
            "SELECT * FROM timesheet_periods WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(period)
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<TimesheetPeriod>> {
        let periods = sqlx::query_as::<_, TimesheetPeriod>(
            "SELECT * FROM timesheet_periods WHERE organization_id = $1 ORDER BY start_date DESC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(periods)
    }

    /// Open periods whose end date has passed, due for the closing sweep.
    pub async fn find_expired_open(
        &self,
        organization_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<TimesheetPeriod>> {
        let periods = sqlx::query_as::<_, TimesheetPeriod>(
            r#"
            SELECT * FROM timesheet_periods
            WHERE organization_id = $1 AND is_open = TRUE AND end_date < $2
            ORDER BY end_date
            "#,
        )
        .bind(organization_id)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(periods)
    }

    pub async fn latest_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<TimesheetPeriod>> {
        let period = sqlx::query_as::<_, TimesheetPeriod>(
            r#"
            SELECT * FROM timesheet_periods
            WHERE organization_id = $1
            ORDER BY end_date DESC
            LIMIT 1
            "#,
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(period)
    }

    pub async fn close(
        &self,
        organization_id: Uuid,
        id: Uuid,
        total_hours: BigDecimal,
        billable_hours: BigDecimal,
        processed_by: Option<Uuid>,
        processed_at: DateTime<Utc>,
    ) -> Result<TimesheetPeriod> {
        let period = sqlx::query_as::<_, TimesheetPeriod>(
            r#"
            UPDATE timesheet_periods
            SET
                is_open = FALSE,
                total_hours = $1,
                billable_hours = $2,
                processed_by = $3,
                processed_at = $4,
                updated_at = $4
            WHERE
                id = $5 AND organization_id = $6
            RETURNING *
            "#,
        )
        .bind(total_hours)
        .bind(billable_hours)
        .bind(processed_by)
        .bind(processed_at)
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(period)
    }

    pub async fn lock(&self, organization_id: Uuid, id: Uuid) -> Result<TimesheetPeriod> {
        let period = sqlx::query_as::<_, TimesheetPeriod>(
            r#"
            UPDATE timesheet_periods
            SET is_locked = TRUE, updated_at = $1
            WHERE id = $2 AND organization_id = $3
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(period)
    }
}
