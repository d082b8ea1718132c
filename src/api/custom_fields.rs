//! Custom field definition API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::{AuditRepository, CustomFieldRepository},
    middleware::AuthUser,
    models::{CreateCustomFieldRequest, CustomField, CustomFieldType, ModuleId, UpdateCustomFieldRequest},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fields).post(create_field))
        .route(
            "/{id}",
            get(get_field).put(update_field).delete(delete_field),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    module: Option<String>,
}

async fn list_fields(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CustomField>>, AppError> {
    let module = query
        .module
        .as_deref()
        .map(|m| m.parse::<ModuleId>())
        .transpose()
        .map_err(AppError::bad_request)?;

    let repo = CustomFieldRepository::new(&state.db);
    let fields = repo
        .list(auth_user.organization_id, module)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list custom fields: {}", e);
            AppError::internal("Failed to list custom fields")
        })?;

    Ok(Json(fields))
}

async fn get_field(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomField>, AppError> {
    let repo = CustomFieldRepository::new(&state.db);
    let field = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get custom field: {}", e);
            AppError::internal("Failed to get custom field")
        })?
        .ok_or_else(|| AppError::not_found("Custom field not found"))?;

    Ok(Json(field))
}

async fn create_field(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCustomFieldRequest>,
) -> Result<(StatusCode, Json<CustomField>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("Field name cannot be empty"));
    }
    if !payload.module.supports_custom_fields() {
        return Err(AppError::bad_request(format!(
            "Module '{}' does not support custom fields",
            payload.module
        )));
    }
    if payload.field_type == CustomFieldType::Dropdown
        && payload.options.as_deref().unwrap_or_default().is_empty()
    {
        return Err(AppError::bad_request(
            "Dropdown fields require a non-empty options list",
        ));
    }

    let repo = CustomFieldRepository::new(&state.db);
    if repo
        .name_exists(auth_user.organization_id, payload.module, &payload.name)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check field name: {}", e);
            AppError::internal("Failed to check field name")
        })?
    {
        return Err(AppError::conflict(format!(
            "A custom field named '{}' already exists for this module",
            payload.name
        )));
    }

    let field = repo
        .create(auth_user.organization_id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create custom field: {}", e);
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::conflict("Custom field name already exists")
            } else {
                AppError::internal("Failed to create custom field")
            }
        })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "custom_field.create",
            "custom_fields",
            Some(&field.id.to_string()),
            Some(&serde_json::json!({
                "module": field.module.as_str(),
                "name": field.name,
            })),
            None,
        )
        .await;

    Ok((StatusCode::CREATED, Json(field)))
}

async fn update_field(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomFieldRequest>,
) -> Result<Json<CustomField>, AppError> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("Field name cannot be empty"));
        }
    }

    let repo = CustomFieldRepository::new(&state.db);
    let field = repo
        .update(id, auth_user.organization_id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update custom field: {}", e);
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::conflict("Custom field name already exists")
            } else {
                AppError::internal("Failed to update custom field")
            }
        })?
        .ok_or_else(|| AppError::not_found("Custom field not found"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "custom_field.update",
            "custom_fields",
            Some(&field.id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(field))
}

async fn delete_field(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = CustomFieldRepository::new(&state.db);
    let deleted = repo
        .delete(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete custom field: {}", e);
            AppError::internal("Failed to delete custom field")
        })?;

    if !deleted {
        return Err(AppError::not_found("Custom field not found"));
    }

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "custom_field.delete",
            "custom_fields",
            Some(&id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
