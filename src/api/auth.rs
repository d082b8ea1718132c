//! Authentication API endpoints
//!
//! Provides login, tenant bootstrap, and current-user endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::{
    db::{AuditRepository, OrganizationRepository},
    middleware::auth::{create_access_token, AuthUser},
    models::{
        CreateOrganizationRequest, LoginRequest, LoginResponse, SetupUserRequest, UserPublic,
    },
    services::AuthService,
    utils::{validation::validate_subdomain, AppError},
    AppState,
};

/// Create public routes for authentication endpoints (no auth required)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/setup-user", post(setup_user))
}

/// Create protected routes for authentication endpoints (auth required)
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_current_user))
}

/// Login handler
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;

    let auth_service = AuthService::new(state.db.clone());

    let user = auth_service
        .authenticate(&payload.username, &payload.password)
        .await
        .map_err(|e| {
            tracing::error!("Authentication failed: {}", e);
            AppError::internal("Authentication failed")
        })?
        .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

    let access_token = create_access_token(
        &user.id,
        &user.organization_id,
        &user.username,
        &user.email,
        vec![user.role.clone()],
        &state.config.auth.jwt_secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| {
        tracing::error!("Failed to create access token: {}", e);
        AppError::internal("Failed to create access token")
    })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            user.organization_id,
            Some(user.id),
            "auth.login",
            "users",
            Some(&user.id.to_string()),
            None,
            None,
        )
        .await;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in_secs: state.config.auth.token_expiry_hours * 3600,
        user: user.into(),
    }))
}

/// Tenant bootstrap: creates the organization and its first admin user
///
/// POST /api/v1/auth/setup-user
async fn setup_user(
    State(state): State<AppState>,
    Json(payload): Json<SetupUserRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    payload.validate()?;

    if !validate_subdomain(&payload.subdomain) {
        return Err(AppError::bad_request(
            "Subdomain must be lowercase alphanumeric and start with a letter",
        ));
    }
    if payload.password.len() < state.config.auth.password_min_length {
        return Err(AppError::bad_request(format!(
            "Password must be at least {} characters",
            state.config.auth.password_min_length
        )));
    }

    let org_repo = OrganizationRepository::new(&state.db);
    if org_repo
        .get_by_subdomain(&payload.subdomain)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check subdomain: {}", e);
            AppError::internal("Failed to check subdomain")
        })?
        .is_some()
    {
        return Err(AppError::conflict("Subdomain already taken"));
    }

    let org = org_repo
        .create(&CreateOrganizationRequest {
            name: payload.organization_name.clone(),
            subdomain: payload.subdomain.clone(),
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create organization: {}", e);
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::conflict("Subdomain already taken")
            } else {
                AppError::internal("Failed to create organization")
            }
        })?;

    let auth_service = AuthService::new(state.db.clone());
    let user = auth_service
        .create_user(
            org.id,
            &payload.username,
            &payload.email,
            &payload.password,
            "admin",
        )
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("already exists") {
                AppError::conflict(msg)
            } else {
                tracing::error!("Failed to create user: {}", e);
                AppError::internal("Failed to create user")
            }
        })?;

    let access_token = create_access_token(
        &user.id,
        &user.organization_id,
        &user.username,
        &user.email,
        vec![user.role.clone()],
        &state.config.auth.jwt_secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| {
        tracing::error!("Failed to create access token: {}", e);
        AppError::internal("Failed to create access token")
    })?;

    let audit_repo = AuditRepository::new(&state.db);
    let _ = audit_repo
        .insert(
            org.id,
            Some(user.id),
            "auth.setup_user",
            "organizations",
            Some(&org.id.to_string()),
            Some(&serde_json::json!({ "name": org.name, "subdomain": org.subdomain })),
            None,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in_secs: state.config.auth.token_expiry_hours * 3600,
            user: user.into(),
        }),
    ))
}

/// Current user handler
///
/// GET /api/v1/auth/me
async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserPublic>, AppError> {
    let auth_service = AuthService::new(state.db.clone());
    let user = auth_service
        .get_user_by_id(&auth_user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch current user: {}", e);
            AppError::internal("Failed to fetch current user")
        })?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user.into()))
}
