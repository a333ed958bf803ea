use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{ModificationStatus, TimeModificationRequest};

#[derive(Clone)]
pub struct ModificationRepository {
    pool: PgPool,
}

impl ModificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        time_entry_id: Uuid,
        requested_by: Uuid,
        requested_changes: Value,
        reason: String,
    ) -> Result<TimeModificationRequest> {
        let request = sqlx::query_as::<_, TimeModificationRequest>(
            r#"
            INSERT INTO
                time_modification_requests (
                    id, organization_id, time_entry_id, requested_by,
                    requested_changes, reason, status, created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(time_entry_id)
        .bind(requested_by)
        .bind(requested_changes)
        .bind(reason)
        .bind(ModificationStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TimeModificationRequest>> {
        let request = sqlx::query_as::<_, TimeModificationRequest>(
            "SELECT * FROM time_modification_requests WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TimeModificationRequest>> {
        let request = sqlx::query_as::<_, TimeModificationRequest>(
            r#"
            SELECT * FROM time_modification_requests
            WHERE id = $1 AND organization_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(request)
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        time_entry_id: Option<Uuid>,
        status: Option<ModificationStatus>,
    ) -> Result<Vec<TimeModificationRequest>> {
        let requests = sqlx::query_as::<_, TimeModificationRequest>(
            r#"
            SELECT * FROM time_modification_requests
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR time_entry_id = $2)
              AND ($3::varchar IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(time_entry_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Record the review decision. Runs inside the same transaction that
    /// applies (or declines to apply) the changes to the entry.
    pub async fn record_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: ModificationStatus,
        reviewed_by: Uuid,
        review_notes: Option<String>,
    ) -> Result<TimeModificationRequest> {
        let request = sqlx::query_as::<_, TimeModificationRequest>(
            r#"
            UPDATE time_modification_requests
            SET
                status = $1,
                reviewed_by = $2,
                reviewed_at = $3,
                review_notes = $4,
                updated_at = $3
            WHERE
                id = $5
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(reviewed_by)
        .bind(Utc::now())
        .bind(review_notes)
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(request)
    }
}
