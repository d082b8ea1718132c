//! Ticket model
//!
//! Ticket status and queue are free strings referencing the settings
//! registry by name; the repository maintains the registry's in-use counts
//! when those references change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub client: String,
    pub status: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Schema-less overlay validated against the module's custom fields
    pub custom_fields: serde_json::Map<String, Value>,
    pub associated_asset_ids: Vec<Uuid>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub client: String,
    pub status: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub custom_fields: serde_json::Map<String, Value>,
    #[serde(default)]
    pub associated_asset_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub queue: Option<String>,
    pub assignee: Option<String>,
    pub custom_fields: Option<serde_json::Map<String, Value>>,
    pub associated_asset_ids: Option<Vec<Uuid>>,
}

/// Query-string filters for ticket listings; all constraints are conjunctive
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilter {
    /// Comma-separated list of statuses
    pub status: Option<String>,
    pub priority: Option<String>,
    pub queue: Option<String>,
    pub client: Option<String>,
    pub assignee: Option<String>,
}

fn default_priority() -> String {
    "Medium".to_string()
}
