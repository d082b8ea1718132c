//! Ticket API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{AuditRepository, CustomFieldRepository, TicketRepository},
    middleware::AuthUser,
    models::{
        validate_custom_values, CreateTicketRequest, ModuleId, Ticket, TicketFilter,
        UpdateTicketRequest,
    },
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tickets).post(create_ticket))
        .route("/search", get(search_tickets))
        .route(
            "/{id}",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
}

async fn validate_ticket_custom_fields(
    state: &AppState,
    organization_id: Uuid,
    values: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), AppError> {
    if values.is_empty() {
        return Ok(());
    }
    let defs = CustomFieldRepository::new(&state.db)
        .list(organization_id, Some(ModuleId::Tickets))
        .await
        .map_err(|e| {
            tracing::error!("Failed to load custom field definitions: {}", e);
            AppError::internal("Failed to load custom field definitions")
        })?;
    validate_custom_values(&defs, values).map_err(AppError::bad_request)
}

async fn list_tickets(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<TicketFilter>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let repo = TicketRepository::new(&state.db);
    let tickets = repo
        .list(auth_user.organization_id, &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list tickets: {}", e);
            AppError::internal("Failed to list tickets")
        })?;

    Ok(Json(tickets))
}

async fn search_tickets(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let repo = TicketRepository::new(&state.db);
    let tickets = repo
        .search(auth_user.organization_id, &query.q)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search tickets: {}", e);
            AppError::internal("Failed to search tickets")
        })?;

    Ok(Json(tickets))
}

async fn get_ticket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Ticket>, AppError> {
    let repo = TicketRepository::new(&state.db);
    let ticket = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get ticket: {}", e);
            AppError::internal("Failed to get ticket")
        })?
        .ok_or_else(|| AppError::not_found("Ticket not found"))?;

    Ok(Json(ticket))
}

async fn create_ticket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), AppError> {
    payload.validate()?;
    if payload.status.trim().is_empty() {
        return Err(AppError::bad_request("Status cannot be empty"));
    }
    validate_ticket_custom_fields(&state, auth_user.organization_id, &payload.custom_fields)
        .await?;

    let repo = TicketRepository::new(&state.db);
    let ticket = repo
        .create(auth_user.organization_id, auth_user.id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create ticket: {}", e);
            AppError::internal("Failed to create ticket")
        })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "ticket.create",
            "tickets",
            Some(&ticket.id.to_string()),
            Some(&serde_json::json!({ "title": ticket.title, "status": ticket.status })),
            None,
        )
        .await;

    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn update_ticket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTicketRequest>,
) -> Result<Json<Ticket>, AppError> {
    if let Some(status) = &payload.status {
        if status.trim().is_empty() {
            return Err(AppError::bad_request("Status cannot be empty"));
        }
    }
    if let Some(custom_fields) = &payload.custom_fields {
        validate_ticket_custom_fields(&state, auth_user.organization_id, custom_fields).await?;
    }

    let repo = TicketRepository::new(&state.db);
    let ticket = repo
        .update(id, auth_user.organization_id, auth_user.id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update ticket: {}", e);
            AppError::internal("Failed to update ticket")
        })?
        .ok_or_else(|| AppError::not_found("Ticket not found"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "ticket.update",
            "tickets",
            Some(&ticket.id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(ticket))
}

async fn delete_ticket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = TicketRepository::new(&state.db);
    let deleted = repo
        .delete(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete ticket: {}", e);
            AppError::internal("Failed to delete ticket")
        })?;

    if !deleted {
        return Err(AppError::not_found("Ticket not found"));
    }

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "ticket.delete",
            "tickets",
            Some(&id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
