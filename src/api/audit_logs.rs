//! Audit log API endpoints

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    db::AuditRepository,
    middleware::AuthUser,
    models::{AuditLogEntry, AuditLogQuery},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}

async fn list_audit_logs(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLogEntry>>, AppError> {
    let repo = AuditRepository::new(&state.db);
    let entries = repo
        .list(auth_user.organization_id, &query)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list audit logs: {}", e);
            AppError::internal("Failed to list audit logs")
        })?;

    Ok(Json(entries))
}
