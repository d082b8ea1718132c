//! Organization (tenant) model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub subdomain: String,
    pub is_internal_it_mode: bool,
    /// Per-module visibility toggles, keyed by module slug
    pub enabled_modules: BTreeMap<String, bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default module toggles for a freshly created organization
pub fn default_enabled_modules() -> BTreeMap<String, bool> {
    crate::models::ModuleId::ALL
        .iter()
        .map(|m| (m.as_str().to_string(), true))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub subdomain: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub is_internal_it_mode: Option<bool>,
    pub enabled_modules: Option<BTreeMap<String, bool>>,
}
