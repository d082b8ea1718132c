//! Inventory repository
//!
//! Deployment of a stocked unit as a tracked asset is a single transaction:
//! the stock decrement and the asset insert either both land or neither does.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::asset_repository::AssetRepository;
use crate::db::{in_placeholders, parse_db_timestamp, parse_db_uuid};
use crate::models::{
    AssetStatus, AssetType, CreateAssetRequest, CreateInventoryItemRequest, DeployAssetRequest,
    InventoryCategory, InventoryFilter, InventoryItem, UpdateInventoryItemRequest,
};
use crate::utils::validation::split_multi_value;

use super::ticket_repository::SEARCH_LIMIT;

/// Outcome of a deployment attempt; infrastructure failures surface as errors
#[derive(Debug)]
pub enum DeployOutcome {
    Deployed { asset_id: Uuid },
    OutOfStock,
    NotFound,
}

/// Outcome of a stock adjustment
#[derive(Debug)]
pub enum AdjustOutcome {
    Adjusted(InventoryItem),
    WouldGoNegative,
    NotFound,
}

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    id: String,
    organization_id: String,
    sku: String,
    name: String,
    category: String,
    owner: Option<String>,
    location: Option<String>,
    quantity: i64,
    reorder_point: i64,
    unit_cost: Option<f64>,
    warranty_info: Option<String>,
    purchase_info: Option<String>,
    notes: Option<String>,
    created_by: String,
    updated_by: String,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str = "id, organization_id, sku, name, category, owner, location, quantity, \
                       reorder_point, unit_cost, warranty_info, purchase_info, notes, \
                       created_by, updated_by, created_at, updated_at";

pub struct InventoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InventoryRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryItem>> {
        let mut sql = format!(
            "SELECT {} FROM inventory_items WHERE organization_id = ? AND is_deleted = 0",
            COLUMNS
        );

        let categories = filter.category.as_deref().map(split_multi_value);
        if let Some(values) = &categories {
            sql.push_str(&format!(" AND category IN ({})", in_placeholders(values.len())));
        }
        if filter.location.is_some() {
            sql.push_str(" AND location = ?");
        }
        if filter.owner.is_some() {
            sql.push_str(" AND owner = ?");
        }
        if filter.low_stock == Some(true) {
            sql.push_str(" AND quantity <= reorder_point");
        }
        sql.push_str(" ORDER BY name");

        let mut query = sqlx::query_as::<_, InventoryRow>(&sql).bind(organization_id.to_string());
        for value in categories.iter().flatten() {
            query = query.bind(value.clone());
        }
        if let Some(location) = &filter.location {
            query = query.bind(location.clone());
        }
        if let Some(owner) = &filter.owner {
            query = query.bind(owner.clone());
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .context("Failed to list inventory items")?;

        Ok(rows.into_iter().map(row_to_item).collect())
    }

    /// Case-insensitive substring search over name and SKU
    pub async fn search(&self, organization_id: Uuid, term: &str) -> Result<Vec<InventoryItem>> {
        let sql = format!(
            "SELECT {} FROM inventory_items \
             WHERE organization_id = ? AND is_deleted = 0 \
               AND (name LIKE ? OR sku LIKE ?) \
             ORDER BY name LIMIT ?",
            COLUMNS
        );
        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(organization_id.to_string())
            .bind(&pattern)
            .bind(&pattern)
            .bind(SEARCH_LIMIT)
            .fetch_all(self.pool)
            .await
            .context("Failed to search inventory items")?;

        Ok(rows.into_iter().map(row_to_item).collect())
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<InventoryItem>> {
        let sql = format!(
            "SELECT {} FROM inventory_items \
             WHERE id = ? AND organization_id = ? AND is_deleted = 0",
            COLUMNS
        );
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(id.to_string())
            .bind(organization_id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get inventory item")?;

        Ok(row.map(row_to_item))
    }

    pub async fn sku_exists(&self, organization_id: Uuid, sku: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory_items \
             WHERE organization_id = ? AND sku = ? AND is_deleted = 0",
        )
        .bind(organization_id.to_string())
        .bind(sku)
        .fetch_one(self.pool)
        .await
        .context("Failed to check inventory SKU")?;

        Ok(count > 0)
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        req: &CreateInventoryItemRequest,
        category: InventoryCategory,
    ) -> Result<InventoryItem> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO inventory_items
                (id, organization_id, sku, name, category, owner, location, quantity,
                 reorder_point, unit_cost, warranty_info, purchase_info, notes,
                 is_deleted, created_by, updated_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(&req.sku)
        .bind(&req.name)
        .bind(category.as_str())
        .bind(req.owner.as_deref())
        .bind(req.location.as_deref())
        .bind(req.quantity.max(0))
        .bind(req.reorder_point.max(0))
        .bind(req.unit_cost)
        .bind(req.warranty_info.as_deref())
        .bind(req.purchase_info.as_deref())
        .bind(req.notes.as_deref())
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create inventory item")?;

        self.get_by_id(id, organization_id)
            .await?
            .context("Failed to retrieve created inventory item")
    }

    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        req: &UpdateInventoryItemRequest,
        category: Option<InventoryCategory>,
    ) -> Result<Option<InventoryItem>> {
        let Some(existing) = self.get_by_id(id, organization_id).await? else {
            return Ok(None);
        };

        let name = req.name.clone().unwrap_or_else(|| existing.name.clone());
        let category = category.unwrap_or(existing.category);
        let owner = req.owner.clone().or_else(|| existing.owner.clone());
        let location = req.location.clone().or_else(|| existing.location.clone());
        let reorder_point = req.reorder_point.unwrap_or(existing.reorder_point).max(0);
        let unit_cost = req.unit_cost.or(existing.unit_cost);
        let warranty_info = req
            .warranty_info
            .clone()
            .or_else(|| existing.warranty_info.clone());
        let purchase_info = req
            .purchase_info
            .clone()
            .or_else(|| existing.purchase_info.clone());
        let notes = req.notes.clone().or_else(|| existing.notes.clone());
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE inventory_items
            SET name = ?, category = ?, owner = ?, location = ?, reorder_point = ?,
                unit_cost = ?, warranty_info = ?, purchase_info = ?, notes = ?,
                updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
            "#,
        )
        .bind(&name)
        .bind(category.as_str())
        .bind(owner.as_deref())
        .bind(location.as_deref())
        .bind(reorder_point)
        .bind(unit_cost)
        .bind(warranty_info.as_deref())
        .bind(purchase_info.as_deref())
        .bind(notes.as_deref())
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update inventory item")?;

        self.get_by_id(id, organization_id).await
    }

    /// Apply a signed stock delta; refuses adjustments that would take the
    /// quantity below zero
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        delta: i64,
    ) -> Result<AdjustOutcome> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET quantity = quantity + ?, updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ? AND quantity + ? >= 0 AND is_deleted = 0
            "#,
        )
        .bind(delta)
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(delta)
        .execute(self.pool)
        .await
        .context("Failed to adjust stock")?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id, organization_id).await? {
                Some(_) => Ok(AdjustOutcome::WouldGoNegative),
                None => Ok(AdjustOutcome::NotFound),
            };
        }

        match self.get_by_id(id, organization_id).await? {
            Some(item) => Ok(AdjustOutcome::Adjusted(item)),
            None => Ok(AdjustOutcome::NotFound),
        }
    }

    /// Deploy one stocked unit as a tracked asset.
    ///
    /// Runs in a single transaction: the decrement only commits together
    /// with the asset insert, and an out-of-stock item leaves both sides
    /// untouched.
    pub async fn deploy_asset(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        req: &DeployAssetRequest,
        asset_type: AssetType,
    ) -> Result<DeployOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin deployment transaction")?;

        let sql = format!(
            "SELECT {} FROM inventory_items \
             WHERE id = ? AND organization_id = ? AND is_deleted = 0",
            COLUMNS
        );
        let Some(row) = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(id.to_string())
            .bind(organization_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to load inventory item for deployment")?
        else {
            return Ok(DeployOutcome::NotFound);
        };
        let item = row_to_item(row);

        if item.quantity == 0 {
            return Ok(DeployOutcome::OutOfStock);
        }

        let now = Utc::now().to_rfc3339();
        let updated = sqlx::query(
            r#"
            UPDATE inventory_items
            SET quantity = quantity - 1, updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ? AND quantity > 0 AND is_deleted = 0
            "#,
        )
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to decrement stock")?;

        if updated.rows_affected() == 0 {
            return Ok(DeployOutcome::OutOfStock);
        }

        // Carry warranty/purchase details from the stock record into the asset
        let mut notes = req.notes.clone().unwrap_or_default();
        if let Some(warranty) = &item.warranty_info {
            if !notes.is_empty() {
                notes.push('\n');
            }
            notes.push_str(&format!("Warranty: {}", warranty));
        }
        if let Some(purchase) = &item.purchase_info {
            if !notes.is_empty() {
                notes.push('\n');
            }
            notes.push_str(&format!("Purchase: {}", purchase));
        }

        let create = CreateAssetRequest {
            name: req.asset_name.clone(),
            client: req.client.clone().unwrap_or_else(|| "Internal".to_string()),
            asset_type: asset_type.as_str().to_string(),
            status: AssetStatus::Offline.as_str().to_string(),
            is_secure: false,
            ip_address: None,
            mac_address: None,
            os: None,
            serial_number: None,
            purchase_date: None,
            warranty_expiration: None,
            maintenance_schedule: None,
            notes: if notes.is_empty() { None } else { Some(notes) },
            custom_fields: serde_json::Map::new(),
            associated_ticket_ids: Vec::new(),
        };
        let asset_id = AssetRepository::create_in_tx(
            &mut tx,
            organization_id,
            user_id,
            &create,
            asset_type,
            AssetStatus::Offline,
            id,
        )
        .await?;

        tx.commit()
            .await
            .context("Failed to commit deployment transaction")?;

        Ok(DeployOutcome::Deployed { asset_id })
    }

    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE inventory_items
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
        .context("Failed to delete inventory item")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_item(row: InventoryRow) -> InventoryItem {
    let low_stock = row.quantity <= row.reorder_point;
    InventoryItem {
        id: parse_db_uuid(&row.id),
        organization_id: parse_db_uuid(&row.organization_id),
        sku: row.sku,
        name: row.name,
        category: row.category.parse().unwrap_or(InventoryCategory::Hardware),
        owner: row.owner,
        location: row.location,
        quantity: row.quantity,
        reorder_point: row.reorder_point,
        low_stock,
        unit_cost: row.unit_cost,
        warranty_info: row.warranty_info,
        purchase_info: row.purchase_info,
        notes: row.notes,
        created_by: parse_db_uuid(&row.created_by),
        updated_by: parse_db_uuid(&row.updated_by),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
