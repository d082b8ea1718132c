//! Settings registry repository
//!
//! Stores the per-organization, per-module enumerations (statuses,
//! categories, risk levels, locations, queues). Items are soft-deleted and
//! carry an in-use count maintained by the entity repositories that
//! reference them.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

use crate::db::{parse_db_timestamp, parse_db_uuid};
use crate::models::{
    CreateSettingItemRequest, ModuleId, SettingItem, SettingKind, UpdateSettingItemRequest,
};

#[derive(Debug, sqlx::FromRow)]
struct SettingRow {
    id: String,
    organization_id: String,
    module: String,
    kind: String,
    name: String,
    variant: String,
    description: Option<String>,
    in_use_count: i64,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str = "id, organization_id, module, kind, name, variant, description, \
                       in_use_count, created_at, updated_at";

pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        module: ModuleId,
        kind: Option<SettingKind>,
    ) -> Result<Vec<SettingItem>> {
        let mut sql = format!(
            "SELECT {} FROM setting_items WHERE organization_id = ? AND module = ? AND is_deleted = 0",
            COLUMNS
        );
        if kind.is_some() {
            sql.push_str(" AND kind = ?");
        }
        sql.push_str(" ORDER BY kind, name");

        let mut query = sqlx::query_as::<_, SettingRow>(&sql)
            .bind(organization_id.to_string())
            .bind(module.as_str());
        if let Some(kind) = kind {
            query = query.bind(kind.as_str());
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .context("Failed to list setting items")?;

        Ok(rows.into_iter().map(row_to_setting).collect())
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        organization_id: Uuid,
        module: ModuleId,
    ) -> Result<Option<SettingItem>> {
        let sql = format!(
            "SELECT {} FROM setting_items \
             WHERE id = ? AND organization_id = ? AND module = ? AND is_deleted = 0",
            COLUMNS
        );
        let row = sqlx::query_as::<_, SettingRow>(&sql)
            .bind(id.to_string())
            .bind(organization_id.to_string())
            .bind(module.as_str())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get setting item")?;

        Ok(row.map(row_to_setting))
    }

    /// Look up a registry item by name (used for reference validation and
    /// in-use counting)
    pub async fn find_by_name(
        &self,
        organization_id: Uuid,
        module: ModuleId,
        kind: SettingKind,
        name: &str,
    ) -> Result<Option<SettingItem>> {
        let sql = format!(
            "SELECT {} FROM setting_items \
             WHERE organization_id = ? AND module = ? AND kind = ? AND name = ? AND is_deleted = 0",
            COLUMNS
        );
        let row = sqlx::query_as::<_, SettingRow>(&sql)
            .bind(organization_id.to_string())
            .bind(module.as_str())
            .bind(kind.as_str())
            .bind(name)
            .fetch_optional(self.pool)
            .await
            .context("Failed to find setting item by name")?;

        Ok(row.map(row_to_setting))
    }

    /// Returns true if a live item with the same name already exists
    pub async fn name_exists(
        &self,
        organization_id: Uuid,
        module: ModuleId,
        kind: SettingKind,
        name: &str,
    ) -> Result<bool> {
        Ok(self
            .find_by_name(organization_id, module, kind, name)
            .await?
            .is_some())
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        module: ModuleId,
        req: &CreateSettingItemRequest,
    ) -> Result<SettingItem> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO setting_items
                (id, organization_id, module, kind, name, variant, description,
                 in_use_count, is_deleted, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(module.as_str())
        .bind(req.kind.as_str())
        .bind(&req.name)
        .bind(&req.variant)
        .bind(req.description.as_deref())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create setting item")?;

        self.get_by_id(id, organization_id, module)
            .await?
            .context("Failed to retrieve created setting item")
    }

    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        module: ModuleId,
        req: &UpdateSettingItemRequest,
    ) -> Result<Option<SettingItem>> {
        let Some(existing) = self.get_by_id(id, organization_id, module).await? else {
            return Ok(None);
        };

        let name = req.name.clone().unwrap_or(existing.name);
        let variant = req.variant.clone().unwrap_or(existing.variant);
        let description = req.description.clone().or(existing.description);
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE setting_items
            SET name = ?, variant = ?, description = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
            "#,
        )
        .bind(&name)
        .bind(&variant)
        .bind(description.as_deref())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update setting item")?;

        self.get_by_id(id, organization_id, module).await
    }

    /// Soft delete; returns false when the item is missing
    pub async fn delete(&self, id: Uuid, organization_id: Uuid, module: ModuleId) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE setting_items
            SET is_deleted = 1, deleted_at = ?, updated_at = ?
            WHERE id = ? AND organization_id = ? AND module = ? AND is_deleted = 0
            "#,
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(module.as_str())
        .execute(self.pool)
        .await
        .context("Failed to delete setting item")?;

        Ok(result.rows_affected() > 0)
    }

}

/// Shift the in-use count of a named registry item by `delta`.
///
/// References to names with no registry entry are tolerated (the source
/// system never enforced the link); the update is simply a no-op then.
/// Generic over the executor so entity repositories can run the shift
/// inside the same transaction as the entity write.
pub(crate) async fn shift_in_use<'e, E>(
    executor: E,
    organization_id: Uuid,
    module: ModuleId,
    kind: SettingKind,
    name: &str,
    delta: i64,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE setting_items
        SET in_use_count = MAX(0, in_use_count + ?)
        WHERE organization_id = ? AND module = ? AND kind = ? AND name = ? AND is_deleted = 0
        "#,
    )
    .bind(delta)
    .bind(organization_id.to_string())
    .bind(module.as_str())
    .bind(kind.as_str())
    .bind(name)
    .execute(executor)
    .await
    .context("Failed to adjust setting in-use count")?;

    Ok(())
}

fn row_to_setting(row: SettingRow) -> SettingItem {
    SettingItem {
        id: parse_db_uuid(&row.id),
        organization_id: parse_db_uuid(&row.organization_id),
        module: row.module.parse().unwrap_or(ModuleId::Tickets),
        kind: row.kind.parse().unwrap_or(SettingKind::Status),
        name: row.name,
        variant: row.variant,
        description: row.description,
        in_use_count: row.in_use_count,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
