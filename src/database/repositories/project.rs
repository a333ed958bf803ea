use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Project, ProjectInput, ProjectStatus, Task, TaskInput, TaskStatus};

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, organization_id: Uuid, input: ProjectInput) -> Result<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO
                projects (
                    id, organization_id, name, code, description, department_id,
                    manager_id, status, is_billable, hourly_rate, budget_hours,
                    created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.department_id)
        .bind(input.manager_id)
        .bind(input.status.unwrap_or(ProjectStatus::Planned))
        .bind(input.is_billable.unwrap_or(true))
        .bind(&input.hourly_rate)
        .bind(&input.budget_hours)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE id = $1 AND organization_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE organization_id = $1
              AND is_deleted = FALSE
              AND ($2::varchar IS NULL OR status = $2)
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: ProjectInput,
    ) -> Result<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET
                name = $1,
                code = $2,
                description = $3,
                department_id = $4,
                manager_id = $5,
                status = COALESCE($6, status),
                is_billable = COALESCE($7, is_billable),
                hourly_rate = $8,
                budget_hours = $9,
                updated_at = $10
            WHERE
                id = $11 AND organization_id = $12 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.department_id)
        .bind(input.manager_id)
        .bind(input.status)
        .bind(input.is_billable)
        .bind(&input.hourly_rate)
        .bind(&input.budget_hours)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn soft_delete(&self, organization_id: Uuid, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE projects
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

    // Tasks

    pub async fn create_task(
        &self,
        organization_id: Uuid,
        project_id: Uuid,
        input: TaskInput,
    ) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO
                tasks (id, organization_id, project_id, name, description, status, assignee_id, estimated_hours, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(project_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.status.unwrap_or(TaskStatus::Todo))
        .bind(input.assignee_id)
        .bind(&input.estimated_hours)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn find_task(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE id = $1 AND organization_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn list_tasks(&self, organization_id: Uuid, project_id: Uuid) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT * FROM tasks
            WHERE project_id = $1 AND organization_id = $2 AND is_deleted = FALSE
            ORDER BY created_at
            "#,
        )
        .bind(project_id)
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn update_task(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: TaskInput,
    ) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET
                name = $1,
                description = $2,
                status = COALESCE($3, status),
                assignee_id = $4,
                estimated_hours = $5,
                updated_at = $6
            WHERE
                id = $7 AND organization_id = $8 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.status)
        .bind(input.assignee_id)
        .bind(&input.estimated_hours)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn soft_delete_task(&self, organization_id: Uuid, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tasks
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
