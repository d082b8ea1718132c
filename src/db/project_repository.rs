//! Project repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{parse_db_timestamp, parse_db_timestamp_opt, parse_db_uuid};
use crate::models::{CreateProjectRequest, Project, ProjectFilter, UpdateProjectRequest};

use super::ticket_repository::SEARCH_LIMIT;

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: String,
    organization_id: String,
    name: String,
    description: Option<String>,
    client: Option<String>,
    status: String,
    start_date: Option<String>,
    due_date: Option<String>,
    owner: Option<String>,
    created_by: String,
    updated_by: String,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str = "id, organization_id, name, description, client, status, start_date, \
                       due_date, owner, created_by, updated_by, created_at, updated_at";

pub struct ProjectRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>> {
        let mut sql = format!(
            "SELECT {} FROM projects WHERE organization_id = ? AND is_deleted = 0",
            COLUMNS
        );
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.client.is_some() {
            sql.push_str(" AND client = ?");
        }
        if filter.owner.is_some() {
            sql.push_str(" AND owner = ?");
        }
        sql.push_str(" ORDER BY name");

        let mut query = sqlx::query_as::<_, ProjectRow>(&sql).bind(organization_id.to_string());
        if let Some(status) = &filter.status {
            query = query.bind(status.clone());
        }
        if let Some(client) = &filter.client {
            query = query.bind(client.clone());
        }
        if let Some(owner) = &filter.owner {
            query = query.bind(owner.clone());
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .context("Failed to list projects")?;

        Ok(rows.into_iter().map(row_to_project).collect())
    }

    /// Case-insensitive substring search over name and client
    pub async fn search(&self, organization_id: Uuid, term: &str) -> Result<Vec<Project>> {
        let sql = format!(
            "SELECT {} FROM projects \
             WHERE organization_id = ? AND is_deleted = 0 \
               AND (name LIKE ? OR client LIKE ?) \
             ORDER BY name LIMIT ?",
            COLUMNS
        );
        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(organization_id.to_string())
            .bind(&pattern)
            .bind(&pattern)
            .bind(SEARCH_LIMIT)
            .fetch_all(self.pool)
            .await
            .context("Failed to search projects")?;

        Ok(rows.into_iter().map(row_to_project).collect())
    }

    pub async fn get_by_id(&self, id: Uuid, organization_id: Uuid) -> Result<Option<Project>> {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = ? AND organization_id = ? AND is_deleted = 0",
            COLUMNS
        );
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id.to_string())
            .bind(organization_id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get project")?;

        Ok(row.map(row_to_project))
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        req: &CreateProjectRequest,
    ) -> Result<Project> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO projects
                (id, organization_id, name, description, client, status, start_date, due_date,
                 owner, is_deleted, created_by, updated_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(&req.name)
        .bind(req.description.as_deref())
        .bind(req.client.as_deref())
        .bind(&req.status)
        .bind(req.start_date.map(|t| t.to_rfc3339()))
        .bind(req.due_date.map(|t| t.to_rfc3339()))
        .bind(req.owner.as_deref())
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create project")?;

        self.get_by_id(id, organization_id)
            .await?
            .context("Failed to retrieve created project")
    }

    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        req: &UpdateProjectRequest,
    ) -> Result<Option<Project>> {
        let Some(existing) = self.get_by_id(id, organization_id).await? else {
            return Ok(None);
        };

        let name = req.name.clone().unwrap_or_else(|| existing.name.clone());
        let description = req
            .description
            .clone()
            .or_else(|| existing.description.clone());
        let client = req.client.clone().or_else(|| existing.client.clone());
        let status = req.status.clone().unwrap_or_else(|| existing.status.clone());
        let start_date = req.start_date.or(existing.start_date);
        let due_date = req.due_date.or(existing.due_date);
        let owner = req.owner.clone().or_else(|| existing.owner.clone());
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE projects
            SET name = ?, description = ?, client = ?, status = ?, start_date = ?,
                due_date = ?, owner = ?, updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
            "#,
        )
        .bind(&name)
        .bind(description.as_deref())
        .bind(client.as_deref())
        .bind(&status)
        .bind(start_date.map(|t| t.to_rfc3339()))
        .bind(due_date.map(|t| t.to_rfc3339()))
        .bind(owner.as_deref())
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update project")?;

        self.get_by_id(id, organization_id).await
    }

    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET is_deleted = 1, deleted_at = ?, updated_at = ?
            WHERE id = ? AND organization_id = ? AND is_deleted = 0
            "#,
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to delete project")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_project(row: ProjectRow) -> Project {
    Project {
        id: parse_db_uuid(&row.id),
        organization_id: parse_db_uuid(&row.organization_id),
        name: row.name,
        description: row.description,
        client: row.client,
        status: row.status,
        start_date: parse_db_timestamp_opt(row.start_date.as_deref()),
        due_date: parse_db_timestamp_opt(row.due_date.as_deref()),
        owner: row.owner,
        created_by: parse_db_uuid(&row.created_by),
        updated_by: parse_db_uuid(&row.updated_by),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
