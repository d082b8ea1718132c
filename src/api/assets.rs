//! Asset API endpoints

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
    db::{AssetRepository, AuditRepository, CustomFieldRepository},
    middleware::AuthUser,
    models::{
        validate_custom_values, Asset, AssetFilter, AssetStatus, AssetType, CreateAssetRequest,
        ModuleId, UpdateAssetRequest,
    },
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route("/search", get(search_assets))
        .route(
            "/{id}",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
}

async fn validate_asset_custom_fields(
    state: &AppState,
    organization_id: Uuid,
    values: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), AppError> {
    if values.is_empty() {
        return Ok(());
    }
    let defs = CustomFieldRepository::new(&state.db)
        .list(organization_id, Some(ModuleId::Assets))
        .await
        .map_err(|e| {
            tracing::error!("Failed to load custom field definitions: {}", e);
            AppError::internal("Failed to load custom field definitions")
        })?;
    validate_custom_values(&defs, values).map_err(AppError::bad_request)
}

async fn list_assets(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<AssetFilter>,
) -> Result<Json<Vec<Asset>>, AppError> {
    let repo = AssetRepository::new(&state.db);
    let assets = repo
        .list(auth_user.organization_id, &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list assets: {}", e);
            AppError::internal("Failed to list assets")
        })?;

    Ok(Json(assets))
}

async fn search_assets(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Asset>>, AppError> {
    let repo = AssetRepository::new(&state.db);
    let assets = repo
        .search(auth_user.organization_id, &query.q)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search assets: {}", e);
            AppError::internal("Failed to search assets")
        })?;

    Ok(Json(assets))
}

async fn get_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, AppError> {
    let repo = AssetRepository::new(&state.db);
    let asset = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get asset: {}", e);
            AppError::internal("Failed to get asset")
        })?
        .ok_or_else(|| AppError::not_found("Asset not found"))?;

    Ok(Json(asset))
}

async fn create_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<Asset>), AppError> {
    payload.validate()?;
    let asset_type = payload
        .asset_type
        .parse::<AssetType>()
        .map_err(AppError::bad_request)?;
    let status = payload
        .status
        .parse::<AssetStatus>()
        .map_err(AppError::bad_request)?;
    validate_asset_custom_fields(&state, auth_user.organization_id, &payload.custom_fields)
        .await?;

    let repo = AssetRepository::new(&state.db);
    let asset = repo
        .create(
            auth_user.organization_id,
            auth_user.id,
            &payload,
            asset_type,
            status,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to create asset: {}", e);
            AppError::internal("Failed to create asset")
        })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "asset.create",
            "assets",
            Some(&asset.id.to_string()),
            Some(&serde_json::json!({ "name": asset.name, "type": asset.asset_type.as_str() })),
            None,
        )
        .await;

    Ok((StatusCode::CREATED, Json(asset)))
}

async fn update_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssetRequest>,
) -> Result<Json<Asset>, AppError> {
    let asset_type = payload
        .asset_type
        .as_deref()
        .map(|t| t.parse::<AssetType>())
        .transpose()
        .map_err(AppError::bad_request)?;
    let status = payload
        .status
        .as_deref()
        .map(|s| s.parse::<AssetStatus>())
        .transpose()
        .map_err(AppError::bad_request)?;
    if let Some(custom_fields) = &payload.custom_fields {
        validate_asset_custom_fields(&state, auth_user.organization_id, custom_fields).await?;
    }

    let repo = AssetRepository::new(&state.db);
    let asset = repo
        .update(
            id,
            auth_user.organization_id,
            auth_user.id,
            &payload,
            asset_type,
            status,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to update asset: {}", e);
            AppError::internal("Failed to update asset")
        })?
        .ok_or_else(|| AppError::not_found("Asset not found"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "asset.update",
            "assets",
            Some(&asset.id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(asset))
}

async fn delete_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = AssetRepository::new(&state.db);
    let deleted = repo
        .delete(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete asset: {}", e);
            AppError::internal("Failed to delete asset")
        })?;

    if !deleted {
        return Err(AppError::not_found("Asset not found"));
    }

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "asset.delete",
            "assets",
            Some(&id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
