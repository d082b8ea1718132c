//! Asset repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::db::{
    encode_id_list, in_placeholders, parse_db_timestamp, parse_db_timestamp_opt, parse_db_uuid,
    parse_id_list, parse_json_map,
};
use crate::models::{
    Asset, AssetFilter, AssetStatus, AssetType, CreateAssetRequest, UpdateAssetRequest,
};
use crate::utils::validation::split_multi_value;

use super::ticket_repository::SEARCH_LIMIT;

#[derive(Debug, sqlx::FromRow)]
struct AssetRow {
    id: String,
    organization_id: String,
    name: String,
    client: String,
    asset_type: String,
    status: String,
    is_secure: i64,
    last_seen: Option<String>,
    ip_address: Option<String>,
    mac_address: Option<String>,
    os: Option<String>,
    cpu_usage: Option<f64>,
    ram_usage: Option<f64>,
    disk_usage: Option<f64>,
    serial_number: Option<String>,
    purchase_date: Option<String>,
    warranty_expiration: Option<String>,
    maintenance_schedule: Option<String>,
    notes: Option<String>,
    custom_fields: Option<String>,
    associated_ticket_ids: Option<String>,
    source_inventory_id: Option<String>,
    created_by: String,
    updated_by: String,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str = "id, organization_id, name, client, asset_type, status, is_secure, \
                       last_seen, ip_address, mac_address, os, cpu_usage, ram_usage, disk_usage, \
                       serial_number, purchase_date, warranty_expiration, maintenance_schedule, \
                       notes, custom_fields, associated_ticket_ids, source_inventory_id, \
                       created_by, updated_by, created_at, updated_at";

pub struct AssetRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AssetRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, organization_id: Uuid, filter: &AssetFilter) -> Result<Vec<Asset>> {
        let mut sql = format!(
            "SELECT {} FROM assets WHERE organization_id = ? AND is_deleted = 0",
            COLUMNS
        );

        let types = filter.asset_type.as_deref().map(split_multi_value);
        let statuses = filter.status.as_deref().map(split_multi_value);
        if let Some(values) = &types {
            sql.push_str(&format!(" AND asset_type IN ({})", in_placeholders(values.len())));
        }
        if let Some(values) = &statuses {
            sql.push_str(&format!(" AND status IN ({})", in_placeholders(values.len())));
        }
        if filter.client.is_some() {
            sql.push_str(" AND client = ?");
        }
        if filter.is_secure.is_some() {
            sql.push_str(" AND is_secure = ?");
        }
        if filter.maintenance_due == Some(true) {
            sql.push_str(" AND maintenance_schedule IS NOT NULL AND maintenance_schedule <= ?");
        }
        sql.push_str(" ORDER BY name");

        let mut query = sqlx::query_as::<_, AssetRow>(&sql).bind(organization_id.to_string());
        for value in types.iter().flatten() {
            query = query.bind(value.clone());
        }
        for value in statuses.iter().flatten() {
            query = query.bind(value.clone());
        }
        if let Some(client) = &filter.client {
            query = query.bind(client.clone());
        }
        if let Some(is_secure) = filter.is_secure {
            query = query.bind(is_secure as i64);
        }
        if filter.maintenance_due == Some(true) {
            query = query.bind(Utc::now().to_rfc3339());
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .context("Failed to list assets")?;

        Ok(rows.into_iter().map(row_to_asset).collect())
    }

    /// Case-insensitive substring search over name, client and serial number
    pub async fn search(&self, organization_id: Uuid, term: &str) -> Result<Vec<Asset>> {
        let sql = format!(
            "SELECT {} FROM assets \
             WHERE organization_id = ? AND is_deleted = 0 \
               AND (name LIKE ? OR client LIKE ? OR serial_number LIKE ?) \
             ORDER BY name LIMIT ?",
            COLUMNS
        );
        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, AssetRow>(&sql)
            .bind(organization_id.to_string())
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(SEARCH_LIMIT)
            .fetch_all(self.pool)
            .await
            .context("Failed to search assets")?;

        Ok(rows.into_iter().map(row_to_asset).collect())
    }

    pub async fn get_by_id(&self, id: Uuid, organization_id: Uuid) -> Result<Option<Asset>> {
        let sql = format!(
            "SELECT {} FROM assets WHERE id = ? AND organization_id = ? AND is_deleted = 0",
            COLUMNS
        );
        let row = sqlx::query_as::<_, AssetRow>(&sql)
            .bind(id.to_string())
            .bind(organization_id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get asset")?;

        Ok(row.map(row_to_asset))
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        req: &CreateAssetRequest,
        asset_type: AssetType,
        status: AssetStatus,
    ) -> Result<Asset> {
        let id = Uuid::new_v4();
        insert_asset(
            self.pool,
            id,
            organization_id,
            user_id,
            req,
            asset_type,
            status,
            None,
        )
        .await?;

        self.get_by_id(id, organization_id)
            .await?
            .context("Failed to retrieve created asset")
    }

    /// Insert inside an existing transaction; used by inventory deployment
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        organization_id: Uuid,
        user_id: Uuid,
        req: &CreateAssetRequest,
        asset_type: AssetType,
        status: AssetStatus,
        source_inventory_id: Uuid,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        insert_asset(
            &mut **tx,
            id,
            organization_id,
            user_id,
            req,
            asset_type,
            status,
            Some(source_inventory_id),
        )
        .await?;
        Ok(id)
    }

    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        req: &UpdateAssetRequest,
        asset_type: Option<AssetType>,
        status: Option<AssetStatus>,
    ) -> Result<Option<Asset>> {
        let Some(existing) = self.get_by_id(id, organization_id).await? else {
            return Ok(None);
        };

        let name = req.name.clone().unwrap_or_else(|| existing.name.clone());
        let client = req.client.clone().unwrap_or_else(|| existing.client.clone());
        let asset_type = asset_type.unwrap_or(existing.asset_type);
        let status = status.unwrap_or(existing.status);
        let is_secure = req.is_secure.unwrap_or(existing.is_secure);
        let last_seen = req.last_seen.or(existing.last_seen);
        let ip_address = req.ip_address.clone().or_else(|| existing.ip_address.clone());
        let mac_address = req.mac_address.clone().or_else(|| existing.mac_address.clone());
        let os = req.os.clone().or_else(|| existing.os.clone());
        let cpu_usage = req.cpu_usage.or(existing.cpu_usage);
        let ram_usage = req.ram_usage.or(existing.ram_usage);
        let disk_usage = req.disk_usage.or(existing.disk_usage);
        let serial_number = req
            .serial_number
            .clone()
            .or_else(|| existing.serial_number.clone());
        let purchase_date = req.purchase_date.or(existing.purchase_date);
        let warranty_expiration = req.warranty_expiration.or(existing.warranty_expiration);
        let maintenance_schedule = req.maintenance_schedule.or(existing.maintenance_schedule);
        let notes = req.notes.clone().or_else(|| existing.notes.clone());
        let custom_fields = req
            .custom_fields
            .clone()
            .unwrap_or_else(|| existing.custom_fields.clone());
        let ticket_ids = req
            .associated_ticket_ids
            .clone()
            .unwrap_or_else(|| existing.associated_ticket_ids.clone());
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE assets
            SET name = ?, client = ?, asset_type = ?, status = ?, is_secure = ?,
                last_seen = ?, ip_address = ?, mac_address = ?, os = ?,
                cpu_usage = ?, ram_usage = ?, disk_usage = ?, serial_number = ?,
                purchase_date = ?, warranty_expiration = ?, maintenance_schedule = ?,
                notes = ?, custom_fields = ?, associated_ticket_ids = ?,
                updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
            "#,
        )
        .bind(&name)
        .bind(&client)
        .bind(asset_type.as_str())
        .bind(status.as_str())
        .bind(is_secure as i64)
        .bind(last_seen.map(|t| t.to_rfc3339()))
        .bind(ip_address.as_deref())
        .bind(mac_address.as_deref())
        .bind(os.as_deref())
        .bind(cpu_usage)
        .bind(ram_usage)
        .bind(disk_usage)
        .bind(serial_number.as_deref())
        .bind(purchase_date.map(|t| t.to_rfc3339()))
        .bind(warranty_expiration.map(|t| t.to_rfc3339()))
        .bind(maintenance_schedule.map(|t| t.to_rfc3339()))
        .bind(notes.as_deref())
        .bind(serde_json::to_string(&custom_fields)?)
        .bind(encode_id_list(&ticket_ids))
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update asset")?;

        self.get_by_id(id, organization_id).await
    }

    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE assets
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
        .context("Failed to delete asset")?;

        Ok(result.rows_affected() > 0)
    }
}

#[allow(clippy::too_many_arguments)]
async fn insert_asset<'e, E>(
    executor: E,
    id: Uuid,
    organization_id: Uuid,
    user_id: Uuid,
    req: &CreateAssetRequest,
    asset_type: AssetType,
    status: AssetStatus,
    source_inventory_id: Option<Uuid>,
) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = Utc::now().to_rfc3339();
    let custom_fields = serde_json::to_string(&req.custom_fields)?;

    sqlx::query(
        r#"
        INSERT INTO assets
            (id, organization_id, name, client, asset_type, status, is_secure,
             ip_address, mac_address, os, serial_number, purchase_date,
             warranty_expiration, maintenance_schedule, notes, custom_fields,
             associated_ticket_ids, source_inventory_id, is_deleted,
             created_by, updated_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(organization_id.to_string())
    .bind(&req.name)
    .bind(&req.client)
    .bind(asset_type.as_str())
    .bind(status.as_str())
    .bind(req.is_secure as i64)
    .bind(req.ip_address.as_deref())
    .bind(req.mac_address.as_deref())
    .bind(req.os.as_deref())
    .bind(req.serial_number.as_deref())
    .bind(req.purchase_date.map(|t| t.to_rfc3339()))
    .bind(req.warranty_expiration.map(|t| t.to_rfc3339()))
    .bind(req.maintenance_schedule.map(|t| t.to_rfc3339()))
    .bind(req.notes.as_deref())
    .bind(&custom_fields)
    .bind(encode_id_list(&req.associated_ticket_ids))
    .bind(source_inventory_id.map(|i| i.to_string()))
    .bind(user_id.to_string())
    .bind(user_id.to_string())
    .bind(&now)
    .bind(&now)
    .execute(executor)
    .await
    .context("Failed to insert asset")?;

    Ok(())
}

fn row_to_asset(row: AssetRow) -> Asset {
    Asset {
        id: parse_db_uuid(&row.id),
        organization_id: parse_db_uuid(&row.organization_id),
        name: row.name,
        client: row.client,
        asset_type: row.asset_type.parse().unwrap_or(AssetType::Workstation),
        status: row.status.parse().unwrap_or(AssetStatus::Offline),
        is_secure: row.is_secure != 0,
        last_seen: parse_db_timestamp_opt(row.last_seen.as_deref()),
        ip_address: row.ip_address,
        mac_address: row.mac_address,
        os: row.os,
        cpu_usage: row.cpu_usage,
        ram_usage: row.ram_usage,
        disk_usage: row.disk_usage,
        serial_number: row.serial_number,
        purchase_date: parse_db_timestamp_opt(row.purchase_date.as_deref()),
        warranty_expiration: parse_db_timestamp_opt(row.warranty_expiration.as_deref()),
        maintenance_schedule: parse_db_timestamp_opt(row.maintenance_schedule.as_deref()),
        notes: row.notes,
        custom_fields: parse_json_map(row.custom_fields.as_deref()),
        associated_ticket_ids: parse_id_list(row.associated_ticket_ids.as_deref()),
        source_inventory_id: row.source_inventory_id.as_deref().map(parse_db_uuid),
        created_by: parse_db_uuid(&row.created_by),
        updated_by: parse_db_uuid(&row.updated_by),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
