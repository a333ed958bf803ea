use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    ComplianceSettings, CreateUserInput, UpdateComplianceSettingsInput, UpdateUserInput, User,
    UserRole,
};
use crate::services::permissions::permission_strings;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user with role-derived permissions and a default
    /// compliance-settings row in one transaction.
    pub async fn create(
        &self,
        organization_id: Uuid,
        password_hash: String,
        input: CreateUserInput,
    ) -> Result<User> {
        let now = Utc::now();
        let role = input.role.unwrap_or_default();
        let permissions = permission_strings(role);
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO
                users (
                    id, organization_id, email, password_hash, first_name, last_name,
                    role, permissions, department_id, manager_id, hourly_rate,
                    is_active, created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, $12, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(role)
        .bind(&permissions)
        .bind(input.department_id)
        .bind(input.manager_id)
        .bind(&input.hourly_rate)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO
                compliance_settings (id, user_id, created_at, updated_at)
            VALUES
                ($1, $2, $3, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_deleted = FALSE")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    pub async fn find_in_organization(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND organization_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND is_deleted = FALSE",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1 AND is_deleted = FALSE")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(row.0 > 0)
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE organization_id = $1 AND is_deleted = FALSE
            ORDER BY last_name, first_name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn list_active(&self, organization_id: Uuid) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE organization_id = $1 AND is_active = TRUE AND is_deleted = FALSE
            ORDER BY last_name, first_name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<User> {
        // A role change re-derives the permission set; it is never edited
        // directly.
        let permissions = input.role.map(permission_strings);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                role = COALESCE($3, role),
                permissions = COALESCE($4, permissions),
                department_id = COALESCE($5, department_id),
                manager_id = COALESCE($6, manager_id),
                hourly_rate = COALESCE($7, hourly_rate),
                is_active = COALESCE($8, is_active),
                updated_at = $9
            WHERE
                id = $10 AND organization_id = $11 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.role)
        .bind(permissions)
        .bind(input.department_id)
        .bind(input.manager_id)
        .bind(input.hourly_rate)
        .bind(input.is_active)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn soft_delete(&self, organization_id: Uuid, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_deleted = TRUE, is_active = FALSE, deleted_at = $1, updated_at = $1
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

    /// (user, manager) edges for the reports graph of one organization.
    pub async fn report_edges(&self, organization_id: Uuid) -> Result<Vec<(Uuid, Option<Uuid>)>> {
        let edges: Vec<(Uuid, Option<Uuid>)> = sqlx::query_as(
            r#"
            SELECT id, manager_id FROM users
            WHERE organization_id = $1 AND is_active = TRUE AND is_deleted = FALSE
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(edges)
    }

    pub async fn compliance_settings(&self, user_id: Uuid) -> Result<Option<ComplianceSettings>> {
        let settings = sqlx::query_as::<_, ComplianceSettings>(
            "SELECT * FROM compliance_settings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn update_compliance_settings(
        &self,
        user_id: Uuid,
        input: UpdateComplianceSettingsInput,
    ) -> Result<ComplianceSettings> {
        let settings = sqlx::query_as::<_, ComplianceSettings>(
            r#"
            UPDATE compliance_settings
            SET
                max_hours_per_day = COALESCE($1, max_hours_per_day),
                max_hours_per_week = COALESCE($2, max_hours_per_week),
                overtime_rate_multiplier = COALESCE($3, overtime_rate_multiplier),
                updated_at = $4
            WHERE
                user_id = $5
            RETURNING *
            "#,
        )
        .bind(input.max_hours_per_day)
        .bind(input.max_hours_per_week)
        .bind(input.overtime_rate_multiplier)
        .bind(Utc::now())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn count_with_role(&self, organization_id: Uuid, role: UserRole) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM users
            WHERE organization_id = $1 AND role = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(organization_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
