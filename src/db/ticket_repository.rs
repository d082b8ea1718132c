//! Ticket repository
//!
//! Ticket status and queue reference the settings registry by name; every
//! write that changes one of those references shifts the registry's in-use
//! counts so deletion of a referenced item can be refused.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

use crate::db::settings_repository::shift_in_use;
use crate::db::{
    encode_id_list, in_placeholders, parse_db_timestamp, parse_db_uuid, parse_id_list,
    parse_json_map,
};
use crate::models::{
    CreateTicketRequest, ModuleId, SettingKind, Ticket, TicketFilter, UpdateTicketRequest,
};
use crate::utils::validation::split_multi_value;

pub const SEARCH_LIMIT: u32 = 20;

#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: String,
    organization_id: String,
    title: String,
    description: String,
    client: String,
    status: String,
    priority: String,
    queue: Option<String>,
    assignee: Option<String>,
    custom_fields: Option<String>,
    associated_asset_ids: Option<String>,
    created_by: String,
    updated_by: String,
    created_at: String,
    updated_at: String,
}

const COLUMNS: &str = "id, organization_id, title, description, client, status, priority, \
                       queue, assignee, custom_fields, associated_asset_ids, created_by, \
                       updated_by, created_at, updated_at";

pub struct TicketRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TicketRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, organization_id: Uuid, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let mut sql = format!(
            "SELECT {} FROM tickets WHERE organization_id = ? AND is_deleted = 0",
            COLUMNS
        );

        let statuses = filter.status.as_deref().map(split_multi_value);
        let priorities = filter.priority.as_deref().map(split_multi_value);
        if let Some(values) = &statuses {
            sql.push_str(&format!(" AND status IN ({})", in_placeholders(values.len())));
        }
        if let Some(values) = &priorities {
            sql.push_str(&format!(" AND priority IN ({})", in_placeholders(values.len())));
        }
        if filter.queue.is_some() {
            sql.push_str(" AND queue = ?");
        }
        if filter.client.is_some() {
            sql.push_str(" AND client = ?");
        }
        if filter.assignee.is_some() {
            sql.push_str(" AND assignee = ?");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, TicketRow>(&sql).bind(organization_id.to_string());
        for value in statuses.iter().flatten() {
            query = query.bind(value.clone());
        }
        for value in priorities.iter().flatten() {
            query = query.bind(value.clone());
        }
        if let Some(queue) = &filter.queue {
            query = query.bind(queue.clone());
        }
        if let Some(client) = &filter.client {
            query = query.bind(client.clone());
        }
        if let Some(assignee) = &filter.assignee {
            query = query.bind(assignee.clone());
        }

        let rows = query
            .fetch_all(self.pool)
            .await
            .context("Failed to list tickets")?;

        Ok(rows.into_iter().map(row_to_ticket).collect())
    }

    /// Case-insensitive substring search over title and client
    pub async fn search(&self, organization_id: Uuid, term: &str) -> Result<Vec<Ticket>> {
        let sql = format!(
            "SELECT {} FROM tickets \
             WHERE organization_id = ? AND is_deleted = 0 \
               AND (title LIKE ? OR client LIKE ?) \
             ORDER BY created_at DESC LIMIT ?",
            COLUMNS
        );
        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, TicketRow>(&sql)
            .bind(organization_id.to_string())
            .bind(&pattern)
            .bind(&pattern)
            .bind(SEARCH_LIMIT)
            .fetch_all(self.pool)
            .await
            .context("Failed to search tickets")?;

        Ok(rows.into_iter().map(row_to_ticket).collect())
    }

    pub async fn get_by_id(&self, id: Uuid, organization_id: Uuid) -> Result<Option<Ticket>> {
        Ok(fetch_live_ticket(self.pool, id, organization_id)
            .await?
            .map(row_to_ticket))
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        req: &CreateTicketRequest,
    ) -> Result<Ticket> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let custom_fields = serde_json::to_string(&req.custom_fields)?;

        // The insert and the registry counter shifts commit together
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO tickets
                (id, organization_id, title, description, client, status, priority, queue,
                 assignee, custom_fields, associated_asset_ids, is_deleted,
                 created_by, updated_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.client)
        .bind(&req.status)
        .bind(&req.priority)
        .bind(req.queue.as_deref())
        .bind(req.assignee.as_deref())
        .bind(&custom_fields)
        .bind(encode_id_list(&req.associated_asset_ids))
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to create ticket")?;

        shift_in_use(&mut *tx, organization_id, ModuleId::Tickets, SettingKind::Status, &req.status, 1)
            .await?;
        if let Some(queue) = &req.queue {
            shift_in_use(&mut *tx, organization_id, ModuleId::Tickets, SettingKind::Queue, queue, 1)
                .await?;
        }

        tx.commit().await.context("Failed to commit ticket create")?;

        self.get_by_id(id, organization_id)
            .await?
            .context("Failed to retrieve created ticket")
    }

    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        user_id: Uuid,
        req: &UpdateTicketRequest,
    ) -> Result<Option<Ticket>> {
        // Read the old row inside the transaction so the counter shifts are
        // computed against the same state the update replaces
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let Some(existing) = fetch_live_ticket(&mut *tx, id, organization_id)
            .await?
            .map(row_to_ticket)
        else {
            return Ok(None);
        };

        let title = req.title.clone().unwrap_or_else(|| existing.title.clone());
        let description = req
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone());
        let client = req.client.clone().unwrap_or_else(|| existing.client.clone());
        let status = req.status.clone().unwrap_or_else(|| existing.status.clone());
        let priority = req
            .priority
            .clone()
            .unwrap_or_else(|| existing.priority.clone());
        let queue = req.queue.clone().or_else(|| existing.queue.clone());
        let assignee = req.assignee.clone().or_else(|| existing.assignee.clone());
        let custom_fields = req
            .custom_fields
            .clone()
            .unwrap_or_else(|| existing.custom_fields.clone());
        let asset_ids = req
            .associated_asset_ids
            .clone()
            .unwrap_or_else(|| existing.associated_asset_ids.clone());
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE tickets
            SET title = ?, description = ?, client = ?, status = ?, priority = ?,
                queue = ?, assignee = ?, custom_fields = ?, associated_asset_ids = ?,
                updated_by = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
            "#,
        )
        .bind(&title)
        .bind(&description)
        .bind(&client)
        .bind(&status)
        .bind(&priority)
        .bind(queue.as_deref())
        .bind(assignee.as_deref())
        .bind(serde_json::to_string(&custom_fields)?)
        .bind(encode_id_list(&asset_ids))
        .bind(user_id.to_string())
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to update ticket")?;

        if status != existing.status {
            shift_in_use(&mut *tx, organization_id, ModuleId::Tickets, SettingKind::Status, &existing.status, -1)
                .await?;
            shift_in_use(&mut *tx, organization_id, ModuleId::Tickets, SettingKind::Status, &status, 1)
                .await?;
        }
        if queue != existing.queue {
            if let Some(old) = &existing.queue {
                shift_in_use(&mut *tx, organization_id, ModuleId::Tickets, SettingKind::Queue, old, -1)
                    .await?;
            }
            if let Some(new) = &queue {
                shift_in_use(&mut *tx, organization_id, ModuleId::Tickets, SettingKind::Queue, new, 1)
                    .await?;
            }
        }

        tx.commit().await.context("Failed to commit ticket update")?;

        self.get_by_id(id, organization_id).await
    }

    /// Soft delete, releasing the registry references the ticket held
    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let Some(existing) = fetch_live_ticket(&mut *tx, id, organization_id)
            .await?
            .map(row_to_ticket)
        else {
            return Ok(false);
        };

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET is_deleted = 1, deleted_at = ?, updated_at = ?
            WHERE id = ? AND organization_id = ? AND is_deleted = 0
            "#,
        )
        .bind(&now)
        .bind(&now)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to delete ticket")?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        shift_in_use(&mut *tx, organization_id, ModuleId::Tickets, SettingKind::Status, &existing.status, -1)
            .await?;
        if let Some(queue) = &existing.queue {
            shift_in_use(&mut *tx, organization_id, ModuleId::Tickets, SettingKind::Queue, queue, -1)
                .await?;
        }

        tx.commit().await.context("Failed to commit ticket delete")?;

        Ok(true)
    }
}

async fn fetch_live_ticket<'e, E>(
    executor: E,
    id: Uuid,
    organization_id: Uuid,
) -> Result<Option<TicketRow>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM tickets WHERE id = ? AND organization_id = ? AND is_deleted = 0",
        COLUMNS
    );
    sqlx::query_as::<_, TicketRow>(&sql)
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .fetch_optional(executor)
        .await
        .context("Failed to get ticket")
}

fn row_to_ticket(row: TicketRow) -> Ticket {
    Ticket {
        id: parse_db_uuid(&row.id),
        organization_id: parse_db_uuid(&row.organization_id),
        title: row.title,
        description: row.description,
        client: row.client,
        status: row.status,
        priority: row.priority,
        queue: row.queue,
        assignee: row.assignee,
        custom_fields: parse_json_map(row.custom_fields.as_deref()),
        associated_asset_ids: parse_id_list(row.associated_asset_ids.as_deref()),
        created_by: parse_db_uuid(&row.created_by),
        updated_by: parse_db_uuid(&row.updated_by),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
