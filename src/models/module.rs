//! Module identifiers
//!
//! Every settings registry item and custom field definition is scoped to one
//! of the application modules. The wire form is the kebab-case module slug
//! used in URLs (`/settings/change-management`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleId {
    Tickets,
    Assets,
    Inventory,
    ChangeManagement,
    Projects,
    Clients,
}

impl ModuleId {
    pub const ALL: [ModuleId; 6] = [
        ModuleId::Tickets,
        ModuleId::Assets,
        ModuleId::Inventory,
        ModuleId::ChangeManagement,
        ModuleId::Projects,
        ModuleId::Clients,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::Tickets => "tickets",
            ModuleId::Assets => "assets",
            ModuleId::Inventory => "inventory",
            ModuleId::ChangeManagement => "change-management",
            ModuleId::Projects => "projects",
            ModuleId::Clients => "clients",
        }
    }

    /// Modules that accept custom field definitions
    pub fn supports_custom_fields(&self) -> bool {
        matches!(self, ModuleId::Tickets | ModuleId::Assets | ModuleId::Clients)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown module '{}', allowed: {}",
                    s,
                    Self::ALL.map(|m| m.as_str()).join(", ")
                )
            })
    }
}
