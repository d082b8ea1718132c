//! Custom field definition repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{parse_db_timestamp, parse_db_uuid};
use crate::models::{
    CreateCustomFieldRequest, CustomField, CustomFieldType, ModuleId, UpdateCustomFieldRequest,
};

#[derive(Debug, sqlx::FromRow)]
struct CustomFieldRow {
    id: String,
    organization_id: String,
    module: String,
    name: String,
    field_type: String,
    required: i64,
    options: Option<String>,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str =
    "id, organization_id, module, name, field_type, required, options, created_at, updated_at";

pub struct CustomFieldRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomFieldRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        module: Option<ModuleId>,
    ) -> Result<Vec<CustomField>> {
        let mut sql = format!(
            "SELECT {} FROM custom_fields WHERE organization_id = ?",
            COLUMNS
        );
        if module.is_some() {
            sql.push_str(" AND module = ?");
        }
        sql.push_str(" ORDER BY module, name");

        let mut query =
            sqlx::query_as::<_, CustomFieldRow>(&sql).bind(organization_id.to_string());
        if let Some(module) = module {
            query = query.bind(module.as_str());
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .context("Failed to list custom fields")?;

        Ok(rows.into_iter().map(row_to_field).collect())
    }

    pub async fn get_by_id(&self, id: Uuid, organization_id: Uuid) -> Result<Option<CustomField>> {
        let sql = format!(
            "SELECT {} FROM custom_fields WHERE id = ? AND organization_id = ?",
            COLUMNS
        );
        let row = sqlx::query_as::<_, CustomFieldRow>(&sql)
            .bind(id.to_string())
            .bind(organization_id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get custom field")?;

        Ok(row.map(row_to_field))
    }

    pub async fn name_exists(
        &self,
        organization_id: Uuid,
        module: ModuleId,
        name: &str,
    ) -> Result<bool> {
        let row = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM custom_fields WHERE organization_id = ? AND module = ? AND name = ?",
        )
        .bind(organization_id.to_string())
        .bind(module.as_str())
        .bind(name)
        .fetch_one(self.pool)
        .await
        .context("Failed to check custom field name")?;

        Ok(row > 0)
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        req: &CreateCustomFieldRequest,
    ) -> Result<CustomField> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let options = req
            .options
            .as_ref()
            .map(|o| serde_json::to_string(o))
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO custom_fields
                (id, organization_id, module, name, field_type, required, options, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(req.module.as_str())
        .bind(&req.name)
        .bind(req.field_type.as_str())
        .bind(req.required as i64)
        .bind(options.as_deref())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create custom field")?;

        self.get_by_id(id, organization_id)
            .await?
            .context("Failed to retrieve created custom field")
    }

    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        req: &UpdateCustomFieldRequest,
    ) -> Result<Option<CustomField>> {
        let Some(existing) = self.get_by_id(id, organization_id).await? else {
            return Ok(None);
        };

        let name = req.name.clone().unwrap_or(existing.name);
        let required = req.required.unwrap_or(existing.required);
        let options = req.options.clone().or(existing.options);
        let options_json = options.map(|o| serde_json::to_string(&o)).transpose()?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE custom_fields
            SET name = ?, required = ?, options = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
            "#,
        )
        .bind(&name)
        .bind(required as i64)
        .bind(options_json.as_deref())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update custom field")?;

        self.get_by_id(id, organization_id).await
    }

    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM custom_fields WHERE id = ? AND organization_id = ?")
                .bind(id.to_string())
                .bind(organization_id.to_string())
                .execute(self.pool)
                .await
                .context("Failed to delete custom field")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_field(row: CustomFieldRow) -> CustomField {
    CustomField {
        id: parse_db_uuid(&row.id),
        organization_id: parse_db_uuid(&row.organization_id),
        module: row.module.parse().unwrap_or(ModuleId::Tickets),
        name: row.name,
        field_type: row.field_type.parse().unwrap_or(CustomFieldType::Text),
        required: row.required != 0,
        options: row
            .options
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok()),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
