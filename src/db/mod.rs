//! Database layer
//!
//! One repository per resource, all backed by a shared SQLite pool. IDs and
//! timestamps are stored as TEXT; ID-list associations are stored as JSON
//! arrays and resolved by the caller. The row-mapping helpers shared by the
//! repositories live here.

pub mod asset_repository;
pub mod audit_repository;
pub mod change_request_repository;
pub mod custom_field_repository;
pub mod inventory_repository;
pub mod organization_repository;
pub mod project_repository;
pub mod settings_repository;
pub mod ticket_repository;

pub use asset_repository::AssetRepository;
pub use audit_repository::AuditRepository;
pub use change_request_repository::ChangeRequestRepository;
pub use custom_field_repository::CustomFieldRepository;
pub use inventory_repository::InventoryRepository;
pub use organization_repository::OrganizationRepository;
pub use project_repository::ProjectRepository;
pub use settings_repository::SettingsRepository;
pub use ticket_repository::TicketRepository;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let connect_options = config
        .url
        .parse::<SqliteConnectOptions>()
        .context("Failed to parse database URL")?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(config.connect_timeout_secs))
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connect_options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Check database connectivity
pub async fn check_health(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// Parse a stored timestamp; falls back to now for malformed rows
pub(crate) fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

pub(crate) fn parse_db_timestamp_opt(ts: Option<&str>) -> Option<DateTime<Utc>> {
    ts.map(parse_db_timestamp)
}

pub(crate) fn parse_db_uuid(id: &str) -> Uuid {
    Uuid::parse_str(id).unwrap_or_else(|_| Uuid::nil())
}

/// Decode a JSON-array column of entity IDs
pub(crate) fn parse_id_list(raw: Option<&str>) -> Vec<Uuid> {
    raw.and_then(|s| serde_json::from_str::<Vec<Uuid>>(s).ok())
        .unwrap_or_default()
}

pub(crate) fn encode_id_list(ids: &[Uuid]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON-object column (custom field bags, module toggles)
pub(crate) fn parse_json_map(raw: Option<&str>) -> serde_json::Map<String, serde_json::Value> {
    raw.and_then(|s| serde_json::from_str(s).ok()).unwrap_or_default()
}

/// Build a `?, ?, ...` placeholder list for an IN clause
pub(crate) fn in_placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
