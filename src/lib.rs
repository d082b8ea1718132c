//! Opsdesk Library
//!
//! Core functionality for the Opsdesk service desk backend: tickets,
//! assets, inventory, change management, and per-tenant settings.

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser, Claims};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
}
