//! Project API endpoints

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
    db::{AuditRepository, ProjectRepository},
    middleware::AuthUser,
    models::{CreateProjectRequest, Project, ProjectFilter, UpdateProjectRequest},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/search", get(search_projects))
        .route(
            "/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
}

async fn list_projects(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Project>>, AppError> {
    let repo = ProjectRepository::new(&state.db);
    let projects = repo
        .list(auth_user.organization_id, &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list projects: {}", e);
            AppError::internal("Failed to list projects")
        })?;

    Ok(Json(projects))
}

async fn search_projects(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    let repo = ProjectRepository::new(&state.db);
    let projects = repo
        .search(auth_user.organization_id, &query.q)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search projects: {}", e);
            AppError::internal("Failed to search projects")
        })?;

    Ok(Json(projects))
}

async fn get_project(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, AppError> {
    let repo = ProjectRepository::new(&state.db);
    let project = repo
        .get_by_id(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get project: {}", e);
            AppError::internal("Failed to get project")
        })?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    Ok(Json(project))
}

async fn create_project(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    payload.validate()?;
    if payload.status.trim().is_empty() {
        return Err(AppError::bad_request("Status cannot be empty"));
    }

    let repo = ProjectRepository::new(&state.db);
    let project = repo
        .create(auth_user.organization_id, auth_user.id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create project: {}", e);
            AppError::internal("Failed to create project")
        })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "project.create",
            "projects",
            Some(&project.id.to_string()),
            Some(&serde_json::json!({ "name": project.name })),
            None,
        )
        .await;

    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    if let Some(status) = &payload.status {
        if status.trim().is_empty() {
            return Err(AppError::bad_request("Status cannot be empty"));
        }
    }

    let repo = ProjectRepository::new(&state.db);
    let project = repo
        .update(id, auth_user.organization_id, auth_user.id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update project: {}", e);
            AppError::internal("Failed to update project")
        })?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "project.update",
            "projects",
            Some(&project.id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = ProjectRepository::new(&state.db);
    let deleted = repo
        .delete(id, auth_user.organization_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete project: {}", e);
            AppError::internal("Failed to delete project")
        })?;

    if !deleted {
        return Err(AppError::not_found("Project not found"));
    }

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            auth_user.organization_id,
            Some(auth_user.id),
            "project.delete",
            "projects",
            Some(&id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
