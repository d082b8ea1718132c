//! JWT Authentication Middleware
//!
//! Validates bearer tokens and injects the authenticated user (including
//! their organization) into request extensions. Every protected handler
//! reads its tenant scope from here.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{utils::error::ErrorResponse, AppState};

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Not before timestamp
    pub nbf: i64,
    /// JWT ID (unique identifier for this token)
    pub jti: String,
    /// User roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Organization/tenant ID
    pub organization_id: String,
}

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl TryFrom<Claims> for AuthUser {
    type Error = &'static str;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;
        let organization_id = Uuid::parse_str(&claims.organization_id)
            .map_err(|_| "Invalid organization ID in token")?;
        Ok(Self {
            id,
            organization_id,
            username: claims.username,
            email: claims.email,
            roles: claims.roles,
        })
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "admin")
    }
}

/// Extractor for AuthUser from request extensions
///
/// This allows using AuthUser as a handler parameter after auth middleware has run.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "unauthorized".to_string(),
                    message: "Authentication required".to_string(),
                    details: None,
                }),
            )
        })
    }
}

/// Create a new JWT access token
pub fn create_access_token(
    user_id: &Uuid,
    organization_id: &Uuid,
    username: &str,
    email: &str,
    roles: Vec<String>,
    secret: &str,
    expiry_hours: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiry_hours as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
        nbf: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
        roles,
        organization_id: organization_id.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate and decode a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<TokenData<Claims>, AuthError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })
}

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
            AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "Authentication token has expired")
            }
        };

        let body = ErrorResponse {
            error: "unauthorized".to_string(),
            message: message.to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

/// Authentication middleware
///
/// Extracts and validates the JWT from the Authorization header. On success
/// the AuthUser lands in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_bearer_token(auth_header).ok_or(AuthError::InvalidToken)?;
    let token_data = validate_token(token, &state.config.auth.jwt_secret)?;
    let auth_user: AuthUser = token_data
        .claims
        .try_into()
        .map_err(|_| AuthError::InvalidToken)?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
