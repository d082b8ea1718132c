//! Asset model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetType {
    Server,
    Workstation,
    Network,
    Printer,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [
        AssetType::Server,
        AssetType::Workstation,
        AssetType::Network,
        AssetType::Printer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Server => "Server",
            AssetType::Workstation => "Workstation",
            AssetType::Network => "Network",
            AssetType::Printer => "Printer",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown asset type '{}', allowed: {}",
                    s,
                    Self::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    Online,
    Offline,
    Warning,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 3] =
        [AssetStatus::Online, AssetStatus::Offline, AssetStatus::Warning];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Online => "Online",
            AssetStatus::Offline => "Offline",
            AssetStatus::Warning => "Warning",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown asset status '{}', allowed: {}",
                    s,
                    Self::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub client: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub status: AssetStatus,
    pub is_secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_expiration: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_schedule: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub custom_fields: serde_json::Map<String, Value>,
    pub associated_ticket_ids: Vec<Uuid>,
    /// Set when the asset was deployed from inventory stock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_inventory_id: Option<Uuid>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub client: String,
    /// Enum membership is validated at the route layer to produce a 400
    /// that names the allowed values
    #[serde(rename = "type")]
    pub asset_type: String,
    pub status: String,
    #[serde(default)]
    pub is_secure: bool,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub warranty_expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub maintenance_schedule: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub custom_fields: serde_json::Map<String, Value>,
    #[serde(default)]
    pub associated_ticket_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub client: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub status: Option<String>,
    pub is_secure: Option<bool>,
    pub last_seen: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub os: Option<String>,
    pub cpu_usage: Option<f64>,
    pub ram_usage: Option<f64>,
    pub disk_usage: Option<f64>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub warranty_expiration: Option<DateTime<Utc>>,
    pub maintenance_schedule: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub custom_fields: Option<serde_json::Map<String, Value>>,
    pub associated_ticket_ids: Option<Vec<Uuid>>,
}

/// Query-string filters for asset listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    /// Comma-separated list of asset types
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    /// Comma-separated list of statuses
    pub status: Option<String>,
    pub client: Option<String>,
    pub is_secure: Option<bool>,
    /// Maintenance schedule due (maintenance_schedule <= now)
    pub maintenance_due: Option<bool>,
}
