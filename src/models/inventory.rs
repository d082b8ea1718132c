//! Inventory item model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCategory {
    Hardware,
    #[serde(rename = "Software License")]
    SoftwareLicense,
    Consumable,
    Part,
}

impl InventoryCategory {
    pub const ALL: [InventoryCategory; 4] = [
        InventoryCategory::Hardware,
        InventoryCategory::SoftwareLicense,
        InventoryCategory::Consumable,
        InventoryCategory::Part,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryCategory::Hardware => "Hardware",
            InventoryCategory::SoftwareLicense => "Software License",
            InventoryCategory::Consumable => "Consumable",
            InventoryCategory::Part => "Part",
        }
    }
}

impl fmt::Display for InventoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown category '{}', allowed: {}",
                    s,
                    Self::ALL.map(|c| c.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: InventoryCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub quantity: i64,
    pub reorder_point: i64,
    /// Derived: quantity <= reorder_point
    pub low_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItemRequest {
    pub sku: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub reorder_point: i64,
    #[serde(default)]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub warranty_info: Option<String>,
    #[serde(default)]
    pub purchase_info: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub owner: Option<String>,
    pub location: Option<String>,
    pub reorder_point: Option<i64>,
    pub unit_cost: Option<f64>,
    pub warranty_info: Option<String>,
    pub purchase_info: Option<String>,
    pub notes: Option<String>,
}

/// Stock adjustment: a signed delta plus the reason it happened
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub delta: i64,
    pub reason: String,
}

/// Deploy one stocked unit as a tracked asset
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeployAssetRequest {
    #[validate(length(min = 1, max = 200))]
    pub asset_name: String,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Result of a deployment: both sides of the single unit of work
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployAssetResponse {
    pub asset: crate::models::Asset,
    pub inventory_item: InventoryItem,
}

/// Query-string filters for inventory listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilter {
    /// Comma-separated list of categories
    pub category: Option<String>,
    pub location: Option<String>,
    pub owner: Option<String>,
    /// Only items at or below their reorder point
    pub low_stock: Option<bool>,
}
