//! Inventory API endpoints
//!
//! Stock CRUD plus the two inventory flows: signed stock adjustments and
//! deploying a stocked unit as a tracked asset.

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
    db::{
        inventory_repository::{AdjustOutcome, DeployOutcome},
        AssetRepository, AuditRepository, InventoryRepository,
    },
    middleware::AuthUser,
    models::{
        AdjustStockRequest, AssetType, CreateInventoryItemRequest, DeployAssetRequest,
        DeployAssetResponse, InventoryCategory, InventoryFilter, InventoryItem,
        UpdateInventoryItemRequest,
    },
    utils::{validation::validate_sku, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/search", get(search_items))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/{id}/adjust-stock", post(adjust_stock))
        .route("/{id}/deploy-asset", post(deploy_asset))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
}

async fn list_items(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<InventoryFilter>,
) -> Result<Json<Vec<InventoryItem>>, AppError> {
    let repo = InventoryRepository::new(&state.db);
    let items = repo
        .list(auth_user.organization_id, &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list inventory: {}", e);
            AppError::internal("Failed to list inventory")
        })?;

    Ok(Json(items))
}

async fn search_items(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<InventoryItem>>, AppError> {
    let repo = InventoryRepository::new(&state.db);
    let items = repo
        .search(auth_user.organization_id, &query.q)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search inventory: {}", e);
            AppError::internal("Failed to search inventory")
        })?;

    Ok(Json(items))
}

async fn get_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, AppError> {
    let repo = InventoryRepository::new(&state.db);
    let item = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get inventory item: {}", e);
            AppError::internal("Failed to get inventory item")
        })?
        .ok_or_else(|| AppError::not_found("Inventory item not found"))?;

    Ok(Json(item))
}

async fn create_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateInventoryItemRequest>,
) -> Result<(StatusCode, Json<InventoryItem>), AppError> {
    payload.validate()?;
    if !validate_sku(&payload.sku) {
        return Err(AppError::bad_request("Invalid SKU"));
    }
    if payload.quantity < 0 || payload.reorder_point < 0 {
        return Err(AppError::bad_request(
            "Quantity and reorder point must be non-negative",
        ));
    }
    let category = payload
        .category
        .parse::<InventoryCategory>()
        .map_err(AppError::bad_request)?;

    let repo = InventoryRepository::new(&state.db);
    if repo
        .sku_exists(auth_user.organization_id, &payload.sku)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check SKU: {}", e);
            AppError::internal("Failed to check SKU")
        })?
    {
        return Err(AppError::conflict(format!(
            "SKU '{}' already exists",
            payload.sku
        )));
    }

    let item = repo
        .create(auth_user.organization_id, auth_user.id, &payload, category)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create inventory item: {}", e);
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::conflict("SKU already exists")
            } else {
                AppError::internal("Failed to create inventory item")
            }
        })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "inventory.create",
            "inventory_items",
            Some(&item.id.to_string()),
            Some(&serde_json::json!({ "sku": item.sku, "name": item.name })),
            None,
        )
        .await;

    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryItemRequest>,
) -> Result<Json<InventoryItem>, AppError> {
    let category = payload
        .category
        .as_deref()
        .map(|c| c.parse::<InventoryCategory>())
        .transpose()
        .map_err(AppError::bad_request)?;
    if payload.reorder_point.is_some_and(|r| r < 0) {
        return Err(AppError::bad_request("Reorder point must be non-negative"));
    }

    let repo = InventoryRepository::new(&state.db);
    let item = repo
        .update(id, auth_user.organization_id, auth_user.id, &payload, category)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update inventory item: {}", e);
            AppError::internal("Failed to update inventory item")
        })?
        .ok_or_else(|| AppError::not_found("Inventory item not found"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "inventory.update",
            "inventory_items",
            Some(&item.id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(item))
}

/// POST /api/v1/inventory/{id}/adjust-stock
async fn adjust_stock(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<Json<InventoryItem>, AppError> {
    if payload.reason.trim().is_empty() {
        return Err(AppError::bad_request("Adjustment reason is required"));
    }

    let repo = InventoryRepository::new(&state.db);
    let outcome = repo
        .adjust_stock(id, auth_user.organization_id, auth_user.id, payload.delta)
        .await
        .map_err(|e| {
            tracing::error!("Failed to adjust stock: {}", e);
            AppError::internal("Failed to adjust stock")
        })?;

    let item = match outcome {
        AdjustOutcome::Adjusted(item) => item,
        AdjustOutcome::WouldGoNegative => {
            return Err(AppError::bad_request(
                "Adjustment would take quantity below zero",
            ))
        }
        AdjustOutcome::NotFound => return Err(AppError::not_found("Inventory item not found")),
    };

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "inventory.adjust_stock",
            "inventory_items",
            Some(&item.id.to_string()),
            Some(&serde_json::json!({
                "delta": payload.delta,
                "reason": payload.reason,
                "quantity": item.quantity,
            })),
            None,
        )
        .await;

    Ok(Json(item))
}

/// POST /api/v1/inventory/{id}/deploy-asset
///
/// Decrements stock by one and creates an asset in a single transaction.
async fn deploy_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeployAssetRequest>,
) -> Result<(StatusCode, Json<DeployAssetResponse>), AppError> {
    payload.validate()?;
    let asset_type = payload
        .asset_type
        .as_deref()
        .unwrap_or("Workstation")
        .parse::<AssetType>()
        .map_err(AppError::bad_request)?;

    let repo = InventoryRepository::new(&state.db);
    let outcome = repo
        .deploy_asset(id, auth_user.organization_id, auth_user.id, &payload, asset_type)
        .await
        .map_err(|e| {
            tracing::error!("Failed to deploy asset: {}", e);
            AppError::internal("Failed to deploy asset")
        })?;

    let asset_id = match outcome {
        DeployOutcome::Deployed { asset_id } => asset_id,
        DeployOutcome::OutOfStock => return Err(AppError::conflict("Item is out of stock")),
        DeployOutcome::NotFound => return Err(AppError::not_found("Inventory item not found")),
    };

    let asset = AssetRepository::new(&state.db)
        .get_by_id(asset_id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load deployed asset: {}", e);
            AppError::internal("Failed to load deployed asset")
        })?
        .ok_or_else(|| AppError::internal("Deployed asset missing"))?;
    let item = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reload inventory item: {}", e);
            AppError::internal("Failed to reload inventory item")
        })?
        .ok_or_else(|| AppError::internal("Inventory item missing after deployment"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "inventory.deploy_asset",
            "inventory_items",
            Some(&id.to_string()),
            Some(&serde_json::json!({
                "assetId": asset.id,
                "assetName": asset.name,
                "remainingQuantity": item.quantity,
            })),
            None,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DeployAssetResponse {
            asset,
            inventory_item: item,
        }),
    ))
}

async fn delete_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = InventoryRepository::new(&state.db);
    let deleted = repo
        .delete(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete inventory item: {}", e);
            AppError::internal("Failed to delete inventory item")
        })?;

    if !deleted {
        return Err(AppError::not_found("Inventory item not found"));
    }

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "inventory.delete",
            "inventory_items",
            Some(&id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
