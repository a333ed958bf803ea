use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    CreateOrganizationInput, Department, DepartmentInput, Organization, OrganizationSettings,
    OrganizationStatus, UpdateOrganizationInput, UpdateOrganizationSettingsInput,
};

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an organization together with its default settings row.
    pub async fn create(&self, input: CreateOrganizationInput) -> Result<Organization> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO
                organizations (id, name, slug, email, timezone, currency, status, is_active, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.email)
        .bind(input.timezone.as_deref().unwrap_or("UTC"))
        .bind(input.currency.as_deref().unwrap_or("USD"))
        .bind(OrganizationStatus::Active)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO
                organization_settings (id, organization_id, created_at, updated_at)
            VALUES
                ($1, $2, $3, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(organization)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE slug = $1 AND is_deleted = FALSE",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    pub async fn list_active(&self) -> Result<Vec<Organization>> {
        let organizations = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE is_active = TRUE AND is_deleted = FALSE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(organizations)
    }

    pub async fn update(&self, id: Uuid, input: UpdateOrganizationInput) -> Result<Organization> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET
                name = COALESCE($1, name),
                email = COALESCE($2, email),
                timezone = COALESCE($3, timezone),
                currency = COALESCE($4, currency),
                is_active = COALESCE($5, is_active),
                updated_at = $6
            WHERE
                id = $7 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(input.name)
        .bind(input.email)
        .bind(input.timezone)
        .bind(input.currency)
        .bind(input.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(organization)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE organizations SET is_deleted = TRUE, deleted_at = $1, updated_at = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn settings(&self, organization_id: Uuid) -> Result<Option<OrganizationSettings>> {
        let settings = sqlx::query_as::<_, OrganizationSettings>(
            "SELECT * FROM organization_settings WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn update_settings(
        &self,
        organization_id: Uuid,
        input: UpdateOrganizationSettingsInput,
    ) -> Result<OrganizationSettings> {
        let settings = sqlx::query_as::<_, OrganizationSettings>(
            r#"
            UPDATE organization_settings
            SET
                work_hours_per_day = COALESCE($1, work_hours_per_day),
                overtime_threshold_daily = COALESCE($2, overtime_threshold_daily),
                overtime_threshold_weekly = COALESCE($3, overtime_threshold_weekly),
                overtime_rate_multiplier = COALESCE($4, overtime_rate_multiplier),
                max_daily_hours = COALESCE($5, max_daily_hours),
                require_time_approval = COALESCE($6, require_time_approval),
                auto_stop_after_hours = COALESCE($7, auto_stop_after_hours),
                updated_at = $8
            WHERE
                organization_id = $9
            RETURNING *
            "#,
        )
        .bind(input.work_hours_per_day)
        .bind(input.overtime_threshold_daily)
        .bind(input.overtime_threshold_weekly)
        .bind(input.overtime_rate_multiplier)
        .bind(input.max_daily_hours)
        .bind(input.require_time_approval)
        .bind(input.auto_stop_after_hours)
        .bind(Utc::now())
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    // Departments

    pub async fn create_department(
        &self,
        organization_id: Uuid,
        input: DepartmentInput,
    ) -> Result<Department> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO
                departments (id, organization_id, name, code, parent_id, manager_id, is_active, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, TRUE, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.parent_id)
        .bind(input.manager_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(department)
    }

    pub async fn find_department(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Department>> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE id = $1 AND organization_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }

    pub async fn list_departments(&self, organization_id: Uuid) -> Result<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE organization_id = $1 AND is_deleted = FALSE ORDER BY name",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    pub async fn update_department(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: DepartmentInput,
    ) -> Result<Department> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments
            SET
                name = $1,
                code = $2,
                parent_id = $3,
                manager_id = $4,
                updated_at = $5
            WHERE
                id = $6 AND organization_id = $7 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.parent_id)
        .bind(input.manager_id)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(department)
    }

    pub async fn soft_delete_department(&self, organization_id: Uuid, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE departments
            SET is_deleted = TRUE, deleted_at = $1, updated_at = $1
            WHERE id = $2 AND organization_id = $3
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
