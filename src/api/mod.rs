//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

mod assets;
mod audit_logs;
mod auth;
mod change_requests;
mod custom_fields;
mod health;
mod inventory;
mod organizations;
mod projects;
mod settings;
mod tickets;

pub use health::*;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::health_check_detailed))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth::public_routes())
}

/// Protected API routes (authentication required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::protected_routes())
        .nest("/organizations", organizations::routes())
        .nest("/settings", settings::routes())
        .nest("/custom-fields", custom_fields::routes())
        .nest("/tickets", tickets::routes())
        .nest("/assets", assets::routes())
        .nest("/inventory", inventory::routes())
        .nest("/change-requests", change_requests::routes())
        .nest("/projects", projects::routes())
        .nest("/audit-logs", audit_logs::routes())
}
