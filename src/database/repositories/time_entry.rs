use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{
    ApprovalStatus, BreakEntry, BreakType, DailySummary, TimeEntry,
};

#[derive(Clone)]
pub struct TimeEntryRepository {
    pool: PgPool,
}

impl TimeEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: &TimeEntry,
    ) -> Result<TimeEntry> {
        let inserted = sqlx::query_as::<_, TimeEntry>(
            r#"
            INSERT INTO
                time_entries (
                    id, organization_id, user_id, project_id, task_id, department_id,
                    date, clock_in, clock_out,
                    regular_hours, overtime_hours, total_hours, break_hours,
                    is_billable, hourly_rate, billable_amount,
                    description, status, submitted_at, approved_by, approved_at,
                    approval_notes, is_locked, created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                 $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $24)
            RETURNING *
            "#,
        )
        .bind(entry.id)
        .bind(entry.organization_id)
        .bind(entry.user_id)
        .bind(entry.project_id)
        .bind(entry.task_id)
        .bind(entry.department_id)
        .bind(entry.date)
        .bind(entry.clock_in)
        .bind(entry.clock_out)
        .bind(&entry.regular_hours)
        .bind(&entry.overtime_hours)
        .bind(&entry.total_hours)
        .bind(&entry.break_hours)
        .bind(entry.is_billable)
        .bind(&entry.hourly_rate)
        .bind(&entry.billable_amount)
        .bind(&entry.description)
        .bind(entry.status)
        .bind(entry.submitted_at)
        .bind(entry.approved_by)
        .bind(entry.approved_at)
        .bind(&entry.approval_notes)
        .bind(entry.is_locked)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(inserted)
    }

    /// Persist every mutable column of an entry. Lifecycle operations
    /// mutate the struct in memory and save it back under the row lock.
    pub async fn save(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: &TimeEntry,
    ) -> Result<TimeEntry> {
        let saved = sqlx::query_as::<_, TimeEntry>(
            r#"
            UPDATE time_entries
            SET
                project_id = $1,
                task_id = $2,
                department_id = $3,
                date = $4,
                clock_in = $5,
                clock_out = $6,
                regular_hours = $7,
                overtime_hours = $8,
                total_hours = $9,
                break_hours = $10,
                is_billable = $11,
                hourly_rate = $12,
                billable_amount = $13,
                description = $14,
                status = $15,
                submitted_at = $16,
                approved_by = $17,
                approved_at = $18,
                approval_notes = $19,
                is_locked = $20,
                updated_at = $21
            WHERE
                id = $22
            RETURNING *
            "#,
        )
        .bind(entry.project_id)
        .bind(entry.task_id)
        .bind(entry.department_id)
        .bind(entry.date)
        .bind(entry.clock_in)
        .bind(entry.clock_out)
        .bind(&entry.regular_hours)
        .bind(&entry.overtime_hours)
        .bind(&entry.total_hours)
        .bind(&entry.break_hours)
        .bind(entry.is_billable)
        .bind(&entry.hourly_rate)
        .bind(&entry.billable_amount)
        .bind(&entry.description)
        .bind(entry.status)
        .bind(entry.submitted_at)
        .bind(entry.approved_by)
        .bind(entry.approved_at)
        .bind(&entry.approval_notes)
        .bind(entry.is_locked)
        .bind(Utc::now())
        .bind(entry.id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(saved)
    }

    pub async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> Result<Option<TimeEntry>> {
        let entry = sqlx::query_as::<_, TimeEntry>(
            "SELECT * FROM time_entries WHERE id = $1 AND organization_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Load an entry under a row lock. Serializes concurrent clock-out,
    /// break and approval calls against the same entry.
    pub async fn find_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TimeEntry>> {
        let entry = sqlx::query_as::<_, TimeEntry>(
            r#"
            SELECT * FROM time_entries
            WHERE id = $1 AND organization_id = $2 AND is_deleted = FALSE
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(entry)
    }

    pub async fn find_active_for_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TimeEntry>> {
        let entry = sqlx::query_as::<_, TimeEntry>(
            r#"
            SELECT * FROM time_entries
            WHERE user_id = $1 AND organization_id = $2
              AND clock_out IS NULL AND is_deleted = FALSE
            ORDER BY clock_in DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_active_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TimeEntry>> {
        let entry = sqlx::query_as::<_, TimeEntry>(
            r#"
            SELECT * FROM time_entries
            WHERE user_id = $1 AND organization_id = $2
              AND clock_out IS NULL AND is_deleted = FALSE
            ORDER BY clock_in DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(entry)
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        user_id: Option<Uuid>,
        status: Option<ApprovalStatus>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<TimeEntry>> {
        let entries = sqlx::query_as::<_, TimeEntry>(
            r#"
            SELECT * FROM time_entries
            WHERE organization_id = $1
              AND is_deleted = FALSE
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::varchar IS NULL OR status = $3)
              AND ($4::date IS NULL OR date >= $4)
              AND ($5::date IS NULL OR date <= $5)
            ORDER BY date DESC, clock_in DESC
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(status)
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn soft_delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE time_entries
            SET is_deleted = TRUE, deleted_at = $1, updated_at = $1
            WHERE id = $2 AND organization_id = $3
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    // Breaks

    pub async fn breaks_for_entry(&self, time_entry_id: Uuid) -> Result<Vec<BreakEntry>> {
        let breaks = sqlx::query_as::<_, BreakEntry>(
            "SELECT * FROM break_entries WHERE time_entry_id = $1 ORDER BY start_time",
        )
        .bind(time_entry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(breaks)
    }

    pub async fn breaks_for_entry_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        time_entry_id: Uuid,
    ) -> Result<Vec<BreakEntry>> {
        let breaks = sqlx::query_as::<_, BreakEntry>(
            "SELECT * FROM break_entries WHERE time_entry_id = $1 ORDER BY start_time",
        )
        .bind(time_entry_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(breaks)
    }

    pub async fn find_open_break(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        time_entry_id: Uuid,
    ) -> Result<Option<BreakEntry>> {
        let open = sqlx::query_as::<_, BreakEntry>(
            r#"
            SELECT * FROM break_entries
            WHERE time_entry_id = $1 AND end_time IS NULL
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        )
        .bind(time_entry_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(open)
    }

    pub async fn insert_break(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        organization_id: Uuid,
        time_entry_id: Uuid,
        break_type: BreakType,
        is_paid: bool,
        notes: Option<String>,
        start_time: DateTime<Utc>,
    ) -> Result<BreakEntry> {
        let inserted = sqlx::query_as::<_, BreakEntry>(
            r#"
            INSERT INTO
                break_entries (id, organization_id, time_entry_id, break_type, start_time, is_paid, notes, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(time_entry_id)
        .bind(break_type)
        .bind(start_time)
        .bind(is_paid)
        .bind(notes)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(inserted)
    }

    pub async fn close_break(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        break_id: Uuid,
        end_time: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<BreakEntry> {
        let closed = sqlx::query_as::<_, BreakEntry>(
            r#"
            UPDATE break_entries
            SET end_time = $1, duration_minutes = $2, updated_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(end_time)
        .bind(duration_minutes)
        .bind(Utc::now())
        .bind(break_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(closed)
    }

    // Rollups

    pub async fn daily_summary(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<DailySummary> {
        let summary = sqlx::query_as::<_, DailySummary>(
            r#"
            SELECT
                COALESCE(SUM(total_hours), 0)::numeric(8,2) AS total_hours,
                COALESCE(SUM(overtime_hours), 0)::numeric(8,2) AS overtime_hours,
                COALESCE(SUM(billable_amount), 0)::numeric(10,2) AS billable_amount,
                COUNT(*) AS entry_count
            FROM time_entries
            WHERE organization_id = $1 AND user_id = $2 AND date = $3 AND is_deleted = FALSE
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Completed hours per user over a date window, for the overtime sweep.
    pub async fn hours_by_user_between(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(Uuid, BigDecimal)>> {
        let rows: Vec<(Uuid, BigDecimal)> = sqlx::query_as(
            r#"
            SELECT user_id, COALESCE(SUM(total_hours), 0)::numeric(8,2)
            FROM time_entries
            WHERE organization_id = $1 AND date >= $2 AND date <= $3
              AND clock_out IS NOT NULL AND is_deleted = FALSE
            GROUP BY user_id
            "#,
        )
        .bind(organization_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Entries still open past the cutoff, for the auto-stop sweep.
    pub async fn find_long_running(
        &self,
        organization_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>> {
        let entries = sqlx::query_as::<_, TimeEntry>(
            r#"
            SELECT * FROM time_entries
            WHERE organization_id = $1 AND clock_out IS NULL
              AND clock_in < $2 AND is_deleted = FALSE
            "#,
        )
        .bind(organization_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// (total hours, billable hours) for a closed timesheet period.
    pub async fn totals_between(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(BigDecimal, BigDecimal)> {
        let row: (BigDecimal, BigDecimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(total_hours), 0)::numeric(8,2),
                COALESCE(SUM(total_hours) FILTER (WHERE is_billable), 0)::numeric(8,2)
            FROM time_entries
            WHERE organization_id = $1 AND date >= $2 AND date <= $3
              AND clock_out IS NOT NULL AND is_deleted = FALSE
            "#,
        )
        .bind(organization_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn lock_entries_between(
        &self,
        organization_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE time_entries
            SET is_locked = TRUE, updated_at = $1
            WHERE organization_id = $2 AND date >= $3 AND date <= $4 AND is_deleted = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(organization_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
