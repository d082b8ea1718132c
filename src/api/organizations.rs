//! Organization (tenant) API endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    db::{AuditRepository, OrganizationRepository},
    middleware::AuthUser,
    models::{Organization, UpdateOrganizationRequest},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/current", get(get_current_organization).put(update_current_organization))
        .route("/{id}", get(get_organization))
}

fn require_admin(auth_user: &AuthUser) -> Result<(), AppError> {
    if auth_user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("admin role required"))
    }
}

async fn get_current_organization(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Organization>, AppError> {
    let repo = OrganizationRepository::new(&state.db);
    let org = repo
        .get_by_id(auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get current organization: {}", e);
            AppError::internal("Failed to get current organization")
        })?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    Ok(Json(org))
}

async fn get_organization(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Organization>, AppError> {
    let uuid =
        Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid organization ID"))?;

    // Tenants can only see their own organization
    if uuid != auth_user.organization_id {
        return Err(AppError::not_found("Organization not found"));
    }

    let repo = OrganizationRepository::new(&state.db);
    let org = repo
        .get_by_id(uuid)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get organization: {}", e);
            AppError::internal("Failed to get organization")
        })?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    Ok(Json(org))
}

/// Toggle module enablement, IT mode, or rename the tenant
async fn update_current_organization(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, AppError> {
    require_admin(&auth_user)?;

    let repo = OrganizationRepository::new(&state.db);
    let updated = repo
        .update(auth_user.organization_id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update organization: {}", e);
            AppError::internal("Failed to update organization")
        })?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "organization.update",
            "organizations",
            Some(&updated.id.to_string()),
            Some(&serde_json::json!({ "name": updated.name })),
            None,
        )
        .await;

    Ok(Json(updated))
}
