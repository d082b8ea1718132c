//! Settings registry API endpoints
//!
//! Per-module enumerations (`/settings/{module}`): statuses, categories,
//! risk levels, locations, queues. Items referenced by live entities cannot
//! be deleted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::{AuditRepository, SettingsRepository},
    middleware::AuthUser,
    models::{
        CreateSettingItemRequest, ModuleId, SettingItem, SettingKind, UpdateSettingItemRequest,
    },
    utils::{validation::validate_setting_name, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{module}", get(list_settings).post(create_setting))
        .route(
            "/{module}/{id}",
            get(get_setting).put(update_setting).delete(delete_setting),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    kind: Option<String>,
}

fn parse_module(raw: &str) -> Result<ModuleId, AppError> {
    raw.parse::<ModuleId>().map_err(AppError::bad_request)
}

async fn list_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(module): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SettingItem>>, AppError> {
    let module = parse_module(&module)?;
    let kind = query
        .kind
        .as_deref()
        .map(|k| k.parse::<SettingKind>())
        .transpose()
        .map_err(AppError::bad_request)?;

    let repo = SettingsRepository::new(&state.db);
    let items = repo
        .list(auth_user.organization_id, module, kind)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list settings: {}", e);
            AppError::internal("Failed to list settings")
        })?;

    Ok(Json(items))
}

async fn get_setting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((module, id)): Path<(String, Uuid)>,
) -> Result<Json<SettingItem>, AppError> {
    let module = parse_module(&module)?;

    let repo = SettingsRepository::new(&state.db);
    let item = repo
        .get_by_id(id, auth_user.organization_id, module)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get setting: {}", e);
            AppError::internal("Failed to get setting")
        })?
        .ok_or_else(|| AppError::not_found("Setting not found"))?;

    Ok(Json(item))
}

async fn create_setting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(module): Path<String>,
    Json(payload): Json<CreateSettingItemRequest>,
) -> Result<(StatusCode, Json<SettingItem>), AppError> {
    let module = parse_module(&module)?;

    if !validate_setting_name(&payload.name) {
        return Err(AppError::bad_request("Invalid setting name"));
    }

    let repo = SettingsRepository::new(&state.db);
    if repo
        .name_exists(auth_user.organization_id, module, payload.kind, &payload.name)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check setting name: {}", e);
            AppError::internal("Failed to check setting name")
        })?
    {
        return Err(AppError::conflict(format!(
            "A {} named '{}' already exists",
            payload.kind, payload.name
        )));
    }

    let item = repo
        .create(auth_user.organization_id, module, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create setting: {}", e);
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::conflict("Setting name already exists")
            } else {
                AppError::internal("Failed to create setting")
            }
        })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "setting.create",
            "setting_items",
            Some(&item.id.to_string()),
            Some(&serde_json::json!({
                "module": module.as_str(),
                "kind": item.kind.as_str(),
                "name": item.name,
            })),
            None,
        )
        .await;

    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_setting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((module, id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateSettingItemRequest>,
) -> Result<Json<SettingItem>, AppError> {
    let module = parse_module(&module)?;

    if let Some(name) = &payload.name {
        if !validate_setting_name(name) {
            return Err(AppError::bad_request("Invalid setting name"));
        }
    }

    let repo = SettingsRepository::new(&state.db);

    // Renaming onto an existing live name is a conflict
    if let Some(new_name) = &payload.name {
        if let Some(existing) = repo
            .get_by_id(id, auth_user.organization_id, module)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get setting: {}", e);
                AppError::internal("Failed to get setting")
            })?
        {
            if *new_name != existing.name
                && repo
                    .name_exists(auth_user.organization_id, module, existing.kind, new_name)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to check setting name: {}", e);
                        AppError::internal("Failed to check setting name")
                    })?
            {
                return Err(AppError::conflict(format!(
                    "A {} named '{}' already exists",
                    existing.kind, new_name
                )));
            }
        }
    }

    let item = repo
        .update(id, auth_user.organization_id, module, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update setting: {}", e);
            AppError::internal("Failed to update setting")
        })?
        .ok_or_else(|| AppError::not_found("Setting not found"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "setting.update",
            "setting_items",
            Some(&item.id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(item))
}

async fn delete_setting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((module, id)): Path<(String, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let module = parse_module(&module)?;

    let repo = SettingsRepository::new(&state.db);
    let item = repo
        .get_by_id(id, auth_user.organization_id, module)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get setting: {}", e);
            AppError::internal("Failed to get setting")
        })?
        .ok_or_else(|| AppError::not_found("Setting not found"))?;

    if item.in_use_count > 0 {
        return Err(AppError::conflict(format!(
            "'{}' is referenced by {} record(s) and cannot be deleted",
            item.name, item.in_use_count
        )));
    }

    let deleted = repo
        .delete(id, auth_user.organization_id, module)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete setting: {}", e);
            AppError::internal("Failed to delete setting")
        })?;

    if !deleted {
        return Err(AppError::not_found("Setting not found"));
    }

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "setting.delete",
            "setting_items",
            Some(&id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
