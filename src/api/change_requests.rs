//! Change request API endpoints
//!
//! CRUD plus the approval lifecycle. Approve/reject are dedicated endpoints
//! and only work from `Pending Approval`; plain updates follow the
//! transition table and can never set an approval decision.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{AuditRepository, ChangeRequestRepository},
    middleware::AuthUser,
    models::{
        ApproveChangeRequestRequest, ChangeRequest, ChangeRequestFilter, ChangeRequestStatus,
        CreateChangeRequestRequest, ImpactLevel, RejectChangeRequestRequest, RiskLevel,
        UpdateChangeRequestRequest,
    },
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_change_requests).post(create_change_request))
        .route("/search", get(search_change_requests))
        .route(
            "/{id}",
            get(get_change_request)
                .put(update_change_request)
                .delete(delete_change_request),
        )
        .route("/{id}/approve", post(approve_change_request))
        .route("/{id}/reject", post(reject_change_request))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
}

async fn list_change_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<ChangeRequestFilter>,
) -> Result<Json<Vec<ChangeRequest>>, AppError> {
    let repo = ChangeRequestRepository::new(&state.db);
    let requests = repo
        .list(auth_user.organization_id, &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list change requests: {}", e);
            AppError::internal("Failed to list change requests")
        })?;

    Ok(Json(requests))
}

async fn search_change_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ChangeRequest>>, AppError> {
    let repo = ChangeRequestRepository::new(&state.db);
    let requests = repo
        .search(auth_user.organization_id, &query.q)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search change requests: {}", e);
            AppError::internal("Failed to search change requests")
        })?;

    Ok(Json(requests))
}

async fn get_change_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ChangeRequest>, AppError> {
    let repo = ChangeRequestRepository::new(&state.db);
    let request = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get change request: {}", e);
            AppError::internal("Failed to get change request")
        })?
        .ok_or_else(|| AppError::not_found("Change request not found"))?;

    Ok(Json(request))
}

async fn create_change_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateChangeRequestRequest>,
) -> Result<(StatusCode, Json<ChangeRequest>), AppError> {
    payload.validate()?;
    let risk_level = payload
        .risk_level
        .parse::<RiskLevel>()
        .map_err(AppError::bad_request)?;
    let impact = payload
        .impact
        .parse::<ImpactLevel>()
        .map_err(AppError::bad_request)?;

    let repo = ChangeRequestRepository::new(&state.db);
    let request = repo
        .create(
            auth_user.organization_id,
            auth_user.id,
            &payload,
            risk_level,
            impact,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to create change request: {}", e);
            AppError::internal("Failed to create change request")
        })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "change_request.create",
            "change_requests",
            Some(&request.id.to_string()),
            Some(&serde_json::json!({
                "title": request.title,
                "riskLevel": request.risk_level.as_str(),
            })),
            None,
        )
        .await;

    Ok((StatusCode::CREATED, Json(request)))
}

async fn update_change_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateChangeRequestRequest>,
) -> Result<Json<ChangeRequest>, AppError> {
    let status = payload
        .status
        .as_deref()
        .map(|s| s.parse::<ChangeRequestStatus>())
        .transpose()
        .map_err(AppError::bad_request)?;
    let risk_level = payload
        .risk_level
        .as_deref()
        .map(|r| r.parse::<RiskLevel>())
        .transpose()
        .map_err(AppError::bad_request)?;
    let impact = payload
        .impact
        .as_deref()
        .map(|i| i.parse::<ImpactLevel>())
        .transpose()
        .map_err(AppError::bad_request)?;

    let repo = ChangeRequestRepository::new(&state.db);

    if let Some(next) = status {
        let existing = repo
            .get_by_id(id, auth_user.organization_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get change request: {}", e);
                AppError::internal("Failed to get change request")
            })?
            .ok_or_else(|| AppError::not_found("Change request not found"))?;

        if matches!(
            next,
            ChangeRequestStatus::Approved | ChangeRequestStatus::Rejected
        ) && next != existing.status
        {
            return Err(AppError::conflict(
                "Approval decisions must use the approve/reject endpoints",
            ));
        }
        if !existing.status.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Cannot transition from '{}' to '{}'",
                existing.status, next
            )));
        }
    }

    let request = repo
        .update(
            id,
            auth_user.organization_id,
            auth_user.id,
            &payload,
            status,
            risk_level,
            impact,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to update change request: {}", e);
            AppError::internal("Failed to update change request")
        })?
        .ok_or_else(|| AppError::not_found("Change request not found"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "change_request.update",
            "change_requests",
            Some(&request.id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(request))
}

/// POST /api/v1/change-requests/{id}/approve
async fn approve_change_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveChangeRequestRequest>,
) -> Result<Json<ChangeRequest>, AppError> {
    let repo = ChangeRequestRepository::new(&state.db);
    let existing = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get change request: {}", e);
            AppError::internal("Failed to get change request")
        })?
        .ok_or_else(|| AppError::not_found("Change request not found"))?;

    if !existing.status.is_decidable() {
        return Err(AppError::conflict(format!(
            "Only pending change requests can be approved (current status: '{}')",
            existing.status
        )));
    }

    let approved_by = payload
        .approved_by
        .unwrap_or_else(|| auth_user.username.clone());
    let request = repo
        .approve(id, auth_user.organization_id, auth_user.id, &approved_by)
        .await
        .map_err(|e| {
            tracing::error!("Failed to approve change request: {}", e);
            AppError::internal("Failed to approve change request")
        })?
        .ok_or_else(|| AppError::conflict("Change request is no longer pending"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "change_request.approve",
            "change_requests",
            Some(&request.id.to_string()),
            Some(&serde_json::json!({ "approvedBy": approved_by })),
            None,
        )
        .await;

    Ok(Json(request))
}

/// POST /api/v1/change-requests/{id}/reject
async fn reject_change_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectChangeRequestRequest>,
) -> Result<Json<ChangeRequest>, AppError> {
    if payload.reason.trim().is_empty() {
        return Err(AppError::bad_request("A rejection reason is required"));
    }

    let repo = ChangeRequestRepository::new(&state.db);
    let existing = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get change request: {}", e);
            AppError::internal("Failed to get change request")
        })?
        .ok_or_else(|| AppError::not_found("Change request not found"))?;

    if !existing.status.is_decidable() {
        return Err(AppError::conflict(format!(
            "Only pending change requests can be rejected (current status: '{}')",
            existing.status
        )));
    }

    let rejected_by = payload
        .rejected_by
        .unwrap_or_else(|| auth_user.username.clone());
    let request = repo
        .reject(
            id,
            auth_user.organization_id,
            auth_user.id,
            &rejected_by,
            payload.reason.trim(),
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to reject change request: {}", e);
            AppError::internal("Failed to reject change request")
        })?
        .ok_or_else(|| AppError::conflict("Change request is no longer pending"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "change_request.reject",
            "change_requests",
            Some(&request.id.to_string()),
            Some(&serde_json::json!({
                "rejectedBy": rejected_by,
                "reason": payload.reason.trim(),
            })),
            None,
        )
        .await;

    Ok(Json(request))
}

async fn delete_change_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = ChangeRequestRepository::new(&state.db);
    let deleted = repo
        .delete(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete change request: {}", e);
            AppError::internal("Failed to delete change request")
        })?;

    if !deleted {
        return Err(AppError::not_found("Change request not found"));
    }

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "change_request.delete",
            "change_requests",
            Some(&id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
