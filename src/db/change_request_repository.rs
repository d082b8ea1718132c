//! Change request repository
//!
//! Approval decisions are recorded here; the lifecycle rules themselves
//! (which transitions are legal, when decisions are allowed) live on
//! `ChangeRequestStatus` and are enforced at the route layer.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{
    encode_id_list, in_placeholders, parse_db_timestamp, parse_db_timestamp_opt, parse_db_uuid,
    parse_id_list,
};
use crate::models::{
    ChangeRequest, ChangeRequestFilter, ChangeRequestStatus, CreateChangeRequestRequest,
    ImpactLevel, RiskLevel, UpdateChangeRequestRequest,
};
use crate::utils::validation::split_multi_value;

use super::ticket_repository::SEARCH_LIMIT;

#[derive(Debug, sqlx::FromRow)]
struct ChangeRequestRow {
    id: String,
    organization_id: String,
    title: String,
    description: String,
    client: String,
    status: String,
    risk_level: String,
    impact: String,
    planned_start_date: Option<String>,
    planned_end_date: Option<String>,
    submitted_by: String,
    change_plan: Option<String>,
    rollback_plan: Option<String>,
    approved_by: Option<String>,
    approved_at: Option<String>,
    rejected_by: Option<String>,
    rejected_at: Option<String>,
    rejection_reason: Option<String>,
    associated_asset_ids: Option<String>,
    associated_ticket_ids: Option<String>,
    created_by: String,
    updated_by: String,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str = "id, organization_id, title, description, client, status, risk_level, \
                       impact, planned_start_date, planned_end_date, submitted_by, change_plan, \
                       rollback_plan, approved_by, approved_at, rejected_by, rejected_at, \
                       rejection_reason, associated_asset_ids, associated_ticket_ids, \
                       created_by, updated_by, created_at, updated_at";

pub struct ChangeRequestRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChangeRequestRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
        filter: &ChangeRequestFilter,
    ) -> Result<Vec<ChangeRequest>> {
        let mut sql = format!(
            "SELECT {} FROM change_requests WHERE organization_id = ? AND is_deleted = 0",
            COLUMNS
        );

        let statuses = filter.status.as_deref().map(split_multi_value);
        let risks = filter.risk_level.as_deref().map(split_multi_value);
        if let Some(values) = &statuses {
            sql.push_str(&format!(" AND status IN ({})", in_placeholders(values.len())));
        }
        if let Some(values) = &risks {
            sql.push_str(&format!(" AND risk_level IN ({})", in_placeholders(values.len())));
        }
        if filter.impact.is_some() {
            sql.push_str(" AND impact = ?");
        }
        if filter.client.is_some() {
            sql.push_str(" AND client = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query =
            sqlx::query_as::<_, ChangeRequestRow>(&sql).bind(organization_id.to_string());
        for value in statuses.iter().flatten() {
            query = query.bind(value.clone());
        }
        for value in risks.iter().flatten() {
            query = query.bind(value.clone());
        }
        if let Some(impact) = &filter.impact {
            query = query.bind(impact.clone());
        }
        if let Some(client) = &filter.client {
            query = query.bind(client.clone());
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .context("Failed to list change requests")?;

        Ok(rows.into_iter().map(row_to_change_request).collect())
    }

    /// Case-insensitive substring search over title and client
    pub async fn search(&self, organization_id: Uuid, term: &str) -> Result<Vec<ChangeRequest>> {
        let sql = format!(
            "SELECT {} FROM change_requests \
             WHERE organization_id = ? AND is_deleted = 0 \
               AND (title LIKE ? OR client LIKE ?) \
             ORDER BY created_at DESC LIMIT ?",
            COLUMNS
        );
        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, ChangeRequestRow>(&sql)
            .bind(organization_id.to_string())
            .bind(&pattern)
            .bind(&pattern)
            .bind(SEARCH_LIMIT)
            .fetch_all(self.pool)
            .await
            .context("Failed to search change requests")?;

        Ok(rows.into_iter().map(row_to_change_request).collect())
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<ChangeRequest>> {
        let sql = format!(
            "SELECT {} FROM change_requests \
             WHERE id = ? AND organization_id = ? AND is_deleted = 0",
            COLUMNS
        );
        let row = sqlx::query_as::<_, ChangeRequestRow>(&sql)
            .bind(id.to_string())
            .bind(organization_id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get change request")?;

        Ok(row.map(row_to_change_request))
    }

    /// New change requests always start in Pending Approval
    pub async fn create(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        req: &CreateChangeRequestRequest,
        risk_level: RiskLevel,
        impact: ImpactLevel,
    ) -> Result<ChangeRequest> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO change_requests
                (id, organization_id, title, description, client, status, risk_level, impact,
                 planned_start_date, planned_end_date, submitted_by, change_plan, rollback_plan,
                 associated_asset_ids, associated_ticket_ids, is_deleted,
                 created_by, updated_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.client)
        .bind(ChangeRequestStatus::PendingApproval.as_str())
        .bind(risk_level.as_str())
        .bind(impact.as_str())
        .bind(req.planned_start_date.map(|t| t.to_rfc3339()))
        .bind(req.planned_end_date.map(|t| t.to_rfc3339()))
        .bind(&req.submitted_by)
        .bind(req.change_plan.as_deref())
        .bind(req.rollback_plan.as_deref())
        .bind(encode_id_list(&req.associated_asset_ids))
        .bind(encode_id_list(&req.associated_ticket_ids))
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create change request")?;

        self.get_by_id(id, organization_id)
            .await?
            .context("Failed to retrieve created change request")
    }

    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        req: &UpdateChangeRequestRequest,
        status: Option<ChangeRequestStatus>,
        risk_level: Option<RiskLevel>,
        impact: Option<ImpactLevel>,
    ) -> Result<Option<ChangeRequest>> {
        let Some(existing) = self.get_by_id(id, organization_id).await? else {
            return Ok(None);
        };

        let title = req.title.clone().unwrap_or_else(|| existing.title.clone());
        let description = req
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone());
        let client = req.client.clone().unwrap_or_else(|| existing.client.clone());
        let status = status.unwrap_or(existing.status);
        let risk_level = risk_level.unwrap_or(existing.risk_level);
        let impact = impact.unwrap_or(existing.impact);
        let planned_start = req.planned_start_date.or(existing.planned_start_date);
        let planned_end = req.planned_end_date.or(existing.planned_end_date);
        let change_plan = req
            .change_plan
            .clone()
            .or_else(|| existing.change_plan.clone());
        let rollback_plan = req
            .rollback_plan
            .clone()
            .or_else(|| existing.rollback_plan.clone());
        let asset_ids = req
            .associated_asset_ids
            .clone()
            .unwrap_or_else(|| existing.associated_asset_ids.clone());
        let ticket_ids = req
            .associated_ticket_ids
            .clone()
            .unwrap_or_else(|| existing.associated_ticket_ids.clone());
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE change_requests
            SET title = ?, description = ?, client = ?, status = ?, risk_level = ?, impact = ?,
                planned_start_date = ?, planned_end_date = ?, change_plan = ?, rollback_plan = ?,
                associated_asset_ids = ?, associated_ticket_ids = ?,
                updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
            "#,
        )
        .bind(&title)
        .bind(&description)
        .bind(&client)
        .bind(status.as_str())
        .bind(risk_level.as_str())
        .bind(impact.as_str())
        .bind(planned_start.map(|t| t.to_rfc3339()))
        .bind(planned_end.map(|t| t.to_rfc3339()))
        .bind(change_plan.as_deref())
        .bind(rollback_plan.as_deref())
        .bind(encode_id_list(&asset_ids))
        .bind(encode_id_list(&ticket_ids))
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update change request")?;

        self.get_by_id(id, organization_id).await
    }

    /// Record an approval decision; callers must check `is_decidable` first
    pub async fn approve(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        approved_by: &str,
    ) -> Result<Option<ChangeRequest>> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE change_requests
            SET status = ?, approved_by = ?, approved_at = ?, updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ? AND status = ? AND is_deleted = 0
            "#,
        )
        .bind(ChangeRequestStatus::Approved.as_str())
        .bind(approved_by)
        .bind(&now)
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(ChangeRequestStatus::PendingApproval.as_str())
        .execute(self.pool)
        .await
        .context("Failed to approve change request")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id, organization_id).await
    }

    /// Record a rejection; the reason is required and validated upstream
    pub async fn reject(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        rejected_by: &str,
        reason: &str,
    ) -> Result<Option<ChangeRequest>> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE change_requests
            SET status = ?, rejected_by = ?, rejected_at = ?, rejection_reason = ?,
                updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ? AND status = ? AND is_deleted = 0
            "#,
        )
        .bind(ChangeRequestStatus::Rejected.as_str())
        .bind(rejected_by)
        .bind(&now)
        .bind(reason)
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(ChangeRequestStatus::PendingApproval.as_str())
        .execute(self.pool)
        .await
        .context("Failed to reject change request")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id, organization_id).await
    }

    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE change_requests
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
        .context("Failed to delete change request")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_change_request(row: ChangeRequestRow) -> ChangeRequest {
    ChangeRequest {
        id: parse_db_uuid(&row.id),
        organization_id: parse_db_uuid(&row.organization_id),
        title: row.title,
        description: row.description,
        client: row.client,
        status: row
            .status
            .parse()
            .unwrap_or(ChangeRequestStatus::PendingApproval),
        risk_level: row.risk_level.parse().unwrap_or(RiskLevel::Medium),
        impact: row.impact.parse().unwrap_or(ImpactLevel::Medium),
        planned_start_date: parse_db_timestamp_opt(row.planned_start_date.as_deref()),
        planned_end_date: parse_db_timestamp_opt(row.planned_end_date.as_deref()),
        submitted_by: row.submitted_by,
        change_plan: row.change_plan,
        rollback_plan: row.rollback_plan,
        approved_by: row.approved_by,
        approved_at: parse_db_timestamp_opt(row.approved_at.as_deref()),
        rejected_by: row.rejected_by,
        rejected_at: parse_db_timestamp_opt(row.rejected_at.as_deref()),
        rejection_reason: row.rejection_reason,
        associated_asset_ids: parse_id_list(row.associated_asset_ids.as_deref()),
        associated_ticket_ids: parse_id_list(row.associated_ticket_ids.as_deref()),
        created_by: parse_db_uuid(&row.created_by),
        updated_by: parse_db_uuid(&row.updated_by),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
