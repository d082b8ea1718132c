//! Change request model and lifecycle
//!
//! Lifecycle: Pending Approval -> {Approved, Rejected}; Approved ->
//! In Progress -> Completed; any state -> Cancelled. Approved/Rejected are
//! reachable only through the dedicated approve/reject endpoints.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeRequestStatus {
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl ChangeRequestStatus {
    pub const ALL: [ChangeRequestStatus; 6] = [
        ChangeRequestStatus::PendingApproval,
        ChangeRequestStatus::Approved,
        ChangeRequestStatus::InProgress,
        ChangeRequestStatus::Completed,
        ChangeRequestStatus::Rejected,
        ChangeRequestStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeRequestStatus::PendingApproval => "Pending Approval",
            ChangeRequestStatus::Approved => "Approved",
            ChangeRequestStatus::InProgress => "In Progress",
            ChangeRequestStatus::Completed => "Completed",
            ChangeRequestStatus::Rejected => "Rejected",
            ChangeRequestStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether approve/reject decisions are still possible
    pub fn is_decidable(&self) -> bool {
        matches!(self, ChangeRequestStatus::PendingApproval)
    }

    /// Transitions allowed through a plain update. Approval decisions go
    /// through the dedicated endpoints and are rejected here.
    pub fn can_transition_to(&self, next: ChangeRequestStatus) -> bool {
        use ChangeRequestStatus::*;
        if *self == next {
            return true;
        }
        match (*self, next) {
            (_, Cancelled) => true,
            (Approved, InProgress) => true,
            (InProgress, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ChangeRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown status '{}', allowed: {}",
                    s,
                    Self::ALL.map(|v| v.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] =
        [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High, RiskLevel::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown risk level '{}', allowed: {}",
                    s,
                    Self::ALL.map(|v| v.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub const ALL: [ImpactLevel; 3] = [ImpactLevel::Low, ImpactLevel::Medium, ImpactLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::Low => "Low",
            ImpactLevel::Medium => "Medium",
            ImpactLevel::High => "High",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImpactLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown impact '{}', allowed: {}",
                    s,
                    Self::ALL.map(|v| v.as_str()).join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub client: String,
    pub status: ChangeRequestStatus,
    pub risk_level: RiskLevel,
    pub impact: ImpactLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<DateTime<Utc>>,
    pub submitted_by: String,
    /// Free-text markdown, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub associated_asset_ids: Vec<Uuid>,
    pub associated_ticket_ids: Vec<Uuid>,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChangeRequestRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub client: String,
    pub risk_level: String,
    pub impact: String,
    #[serde(default)]
    pub planned_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub planned_end_date: Option<DateTime<Utc>>,
    pub submitted_by: String,
    #[serde(default)]
    pub change_plan: Option<String>,
    #[serde(default)]
    pub rollback_plan: Option<String>,
    #[serde(default)]
    pub associated_asset_ids: Vec<Uuid>,
    #[serde(default)]
    pub associated_ticket_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChangeRequestRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client: Option<String>,
    pub status: Option<String>,
    pub risk_level: Option<String>,
    pub impact: Option<String>,
    pub planned_start_date: Option<DateTime<Utc>>,
    pub planned_end_date: Option<DateTime<Utc>>,
    pub change_plan: Option<String>,
    pub rollback_plan: Option<String>,
    pub associated_asset_ids: Option<Vec<Uuid>>,
    pub associated_ticket_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveChangeRequestRequest {
    pub approved_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectChangeRequestRequest {
    pub rejected_by: Option<String>,
    /// Must be non-empty; rejections without a reason are a 400
    #[serde(default)]
    pub reason: String,
}

/// Query-string filters for change request listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeRequestFilter {
    /// Comma-separated list of statuses
    pub status: Option<String>,
    /// Comma-separated list of risk levels
    pub risk_level: Option<String>,
    pub impact: Option<String>,
    pub client: Option<String>,
}
