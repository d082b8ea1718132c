//! Custom field definitions and value validation
//!
//! Custom fields are a schema-less overlay on the fixed entity shapes:
//! entities carry a `customFields` bag which is validated here against the
//! module's registered definitions at write time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::ModuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomFieldType {
    Text,
    Textarea,
    Number,
    Checkbox,
    Date,
    Dropdown,
}

impl CustomFieldType {
    pub const ALL: [CustomFieldType; 6] = [
        CustomFieldType::Text,
        CustomFieldType::Textarea,
        CustomFieldType::Number,
        CustomFieldType::Checkbox,
        CustomFieldType::Date,
        CustomFieldType::Dropdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomFieldType::Text => "Text",
            CustomFieldType::Textarea => "Textarea",
            CustomFieldType::Number => "Number",
            CustomFieldType::Checkbox => "Checkbox",
            CustomFieldType::Date => "Date",
            CustomFieldType::Dropdown => "Dropdown",
        }
    }
}

impl fmt::Display for CustomFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomFieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown field type '{}', allowed: {}",
                    s,
                    Self::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub module: ModuleId,
    pub name: String,
    pub field_type: CustomFieldType,
    pub required: bool,
    /// Allowed values; present for dropdown fields only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomFieldRequest {
    pub module: ModuleId,
    pub name: String,
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomFieldRequest {
    pub name: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
}

/// Validate an entity's custom-field bag against the registered definitions.
///
/// Unknown keys are rejected, required fields must be present and non-null,
/// and each value must match its declared type.
pub fn validate_custom_values(
    defs: &[CustomField],
    values: &serde_json::Map<String, Value>,
) -> Result<(), String> {
    for key in values.keys() {
        if !defs.iter().any(|d| d.name == *key) {
            return Err(format!("unknown custom field '{}'", key));
        }
    }

    for def in defs {
        let value = values.get(&def.name);
        match value {
            None | Some(Value::Null) => {
                if def.required {
                    return Err(format!("custom field '{}' is required", def.name));
                }
            }
            Some(value) => validate_custom_value(def, value)?,
        }
    }

    Ok(())
}

fn validate_custom_value(def: &CustomField, value: &Value) -> Result<(), String> {
    match def.field_type {
        CustomFieldType::Text | CustomFieldType::Textarea => {
            if !value.is_string() {
                return Err(format!("custom field '{}' must be a string", def.name));
            }
        }
        CustomFieldType::Number => {
            if !value.is_number() {
                return Err(format!("custom field '{}' must be a number", def.name));
            }
        }
        CustomFieldType::Checkbox => {
            if !value.is_boolean() {
                return Err(format!("custom field '{}' must be a boolean", def.name));
            }
        }
        CustomFieldType::Date => {
            let Some(s) = value.as_str() else {
                return Err(format!("custom field '{}' must be a date string", def.name));
            };
            let is_date = NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
                || DateTime::parse_from_rfc3339(s).is_ok();
            if !is_date {
                return Err(format!(
                    "custom field '{}' must be YYYY-MM-DD or RFC 3339",
                    def.name
                ));
            }
        }
        CustomFieldType::Dropdown => {
            let Some(s) = value.as_str() else {
                return Err(format!("custom field '{}' must be a string", def.name));
            };
            let options = def.options.as_deref().unwrap_or_default();
            if !options.iter().any(|o| o == s) {
                return Err(format!(
                    "custom field '{}' must be one of: {}",
                    def.name,
                    options.join(", ")
                ));
            }
        }
    }
    Ok(())
}
