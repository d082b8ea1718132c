//! Organization (tenant) repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{parse_db_timestamp, parse_db_uuid};
use crate::models::{
    default_enabled_modules, CreateOrganizationRequest, Organization, UpdateOrganizationRequest,
};

#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: String,
    name: String,
    subdomain: String,
    is_internal_it_mode: i64,
    enabled_modules: Option<String>,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str =
    "id, name, subdomain, is_internal_it_mode, enabled_modules, created_at, updated_at";

pub struct OrganizationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Organization>> {
        let sql = format!("SELECT {} FROM organizations WHERE id = ?", COLUMNS);
        let row = sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get organization")?;

        Ok(row.map(row_to_org))
    }

    pub async fn get_by_subdomain(&self, subdomain: &str) -> Result<Option<Organization>> {
        let sql = format!("SELECT {} FROM organizations WHERE subdomain = ?", COLUMNS);
        let row = sqlx::query_as::<_, OrganizationRow>(&sql)
            .bind(subdomain)
            .fetch_optional(self.pool)
            .await
            .context("Failed to get organization by subdomain")?;

        Ok(row.map(row_to_org))
    }

    pub async fn create(&self, req: &CreateOrganizationRequest) -> Result<Organization> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let modules = serde_json::to_string(&default_enabled_modules())?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, subdomain, is_internal_it_mode, enabled_modules, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.name)
        .bind(&req.subdomain)
        .bind(&modules)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create organization")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created organization")
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateOrganizationRequest,
    ) -> Result<Option<Organization>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let name = req.name.clone().unwrap_or(existing.name);
        let is_internal = req.is_internal_it_mode.unwrap_or(existing.is_internal_it_mode);
        let modules = req
            .enabled_modules
            .clone()
            .unwrap_or(existing.enabled_modules);
        let modules_json = serde_json::to_string(&modules)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE organizations
            SET name = ?, is_internal_it_mode = ?, enabled_modules = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&name)
        .bind(is_internal as i64)
        .bind(&modules_json)
        .bind(&now)
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update organization")?;

        self.get_by_id(id).await
    }
}

fn row_to_org(row: OrganizationRow) -> Organization {
    let enabled_modules = row
        .enabled_modules
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();

    Organization {
        id: parse_db_uuid(&row.id),
        name: row.name,
        subdomain: row.subdomain,
        is_internal_it_mode: row.is_internal_it_mode != 0,
        enabled_modules,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
