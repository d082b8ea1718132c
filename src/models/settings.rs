//! Settings registry models
//!
//! Per-organization, per-module collections of user-defined enumerations
//! (statuses, categories, risk levels, locations, queues). Entities reference
//! registry items by name; `in_use_count` tracks those references and guards
//! deletion.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ModuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    Status,
    Category,
    Risk,
    Impact,
    Location,
    Queue,
}

impl SettingKind {
    pub const ALL: [SettingKind; 6] = [
        SettingKind::Status,
        SettingKind::Category,
        SettingKind::Risk,
        SettingKind::Impact,
        SettingKind::Location,
        SettingKind::Queue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKind::Status => "status",
            SettingKind::Category => "category",
            SettingKind::Risk => "risk",
            SettingKind::Impact => "impact",
            SettingKind::Location => "location",
            SettingKind::Queue => "queue",
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown setting kind '{}', allowed: {}",
                    s,
                    Self::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingItem {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub module: ModuleId,
    pub kind: SettingKind,
    pub name: String,
    /// Color/variant tag used by clients when rendering badges
    pub variant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub in_use_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSettingItemRequest {
    pub kind: SettingKind,
    pub name: String,
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingItemRequest {
    pub name: Option<String>,
    pub variant: Option<String>,
    pub description: Option<String>,
}

fn default_variant() -> String {
    "default".to_string()
}
