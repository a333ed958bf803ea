use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Team, TeamInput, TeamMember, User};

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, organization_id: Uuid, input: TeamInput) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO
                teams (id, organization_id, name, description, department_id, lead_id, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.department_id)
        .bind(input.lead_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(team)
    }

    pub async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE id = $1 AND organization_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE organization_id = $1 AND is_deleted = FALSE ORDER BY name",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    pub async fn update(&self, organization_id: Uuid, id: Uuid, input: TeamInput) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET
                name = $1,
                description = $2,
                department_id = $3,
                lead_id = $4,
                updated_at = $5
            WHERE
                id = $6 AND organization_id = $7 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.department_id)
        .bind(input.lead_id)
        .bind(Utc::now())
        .bind(id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(team)
    }

    pub async fn soft_delete(&self, organization_id: Uuid, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE teams
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

    pub async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> Result<TeamMember> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (id, team_id, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (team_id, user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(team_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn remove_member(&self, team_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn members(&self, team_id: Uuid) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN team_members tm ON tm.user_id = u.id
            WHERE tm.team_id = $1 AND u.is_deleted = FALSE
            ORDER BY u.last_name, u.first_name
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
