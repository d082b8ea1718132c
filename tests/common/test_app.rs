//! Test application setup utilities
//!
//! Builds an in-process instance of the API backed by a throwaway SQLite
//! database and provides request helpers that drive it through tower.

use axum::{body::Body, http::Request, Router};
use tower::ServiceExt;
use uuid::Uuid;

use opsdesk::{
    api,
    config::{AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig},
    db, AppState,
};

/// Test application wrapper for integration testing
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// An authenticated tenant bootstrapped through `/auth/setup-user`
pub struct TestSession {
    pub token: String,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
}

impl TestApp {
    /// Create a new test application with a throwaway SQLite database
    pub async fn new() -> Self {
        let config = test_config();

        let db = db::init_pool(&config.database)
            .await
            .expect("Failed to initialize test database");

        let state = AppState { config, db };

        let router = Router::new()
            .nest("/api/v1", api::public_routes())
            .nest(
                "/api/v1",
                api::protected_routes().layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    opsdesk::middleware::auth::auth_middleware,
                )),
            )
            .with_state(state.clone());

        Self { router, state }
    }

    /// Create a test application with one tenant and admin user already set up
    pub async fn with_session() -> (Self, TestSession) {
        let app = Self::new().await;
        let session = app.setup_tenant("acme").await;
        (app, session)
    }

    /// Bootstrap a tenant through the public setup endpoint
    pub async fn setup_tenant(&self, subdomain: &str) -> TestSession {
        let username = format!("admin-{}", subdomain);
        let response = self
            .post_json_anon(
                "/api/v1/auth/setup-user",
                serde_json::json!({
                    "organizationName": format!("{} Inc", subdomain),
                    "subdomain": subdomain,
                    "username": username,
                    "email": format!("admin@{}.example.com", subdomain),
                    "password": "correct-horse-battery",
                }),
            )
            .await;
        response.assert_created();

        let body: serde_json::Value = response.json();
        TestSession {
            token: body["accessToken"].as_str().unwrap().to_string(),
            organization_id: body["user"]["organizationId"]
                .as_str()
                .unwrap()
                .parse()
                .unwrap(),
            user_id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            username,
        }
    }

    /// Make an authenticated GET request
    pub async fn get(&self, uri: &str, session: &TestSession) -> TestResponse {
        self.request(authed(Request::builder().method("GET").uri(uri), session)
            .body(Body::empty())
            .unwrap())
            .await
    }

    /// Make an unauthenticated GET request
    pub async fn get_anon(&self, uri: &str) -> TestResponse {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        session: &TestSession,
    ) -> TestResponse {
        self.request(
            authed(Request::builder().method("POST").uri(uri), session)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an unauthenticated POST request with JSON body
    pub async fn post_json_anon(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated PUT request with JSON body
    pub async fn put_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        session: &TestSession,
    ) -> TestResponse {
        self.request(
            authed(Request::builder().method("PUT").uri(uri), session)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated DELETE request
    pub async fn delete(&self, uri: &str, session: &TestSession) -> TestResponse {
        self.request(
            authed(Request::builder().method("DELETE").uri(uri), session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an arbitrary request
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

fn authed(
    builder: axum::http::request::Builder,
    session: &TestSession,
) -> axum::http::request::Builder {
    builder.header("Authorization", format!("Bearer {}", session.token))
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: axum::http::StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: bytes::Bytes,
}

impl TestResponse {
    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse response as JSON")
    }

    /// Assert the response status
    pub fn assert_status(&self, expected: axum::http::StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Assert the response status is OK (200)
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::OK)
    }

    /// Assert the response status is Created (201)
    pub fn assert_created(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::CREATED)
    }

    /// Assert the response status is Bad Request (400)
    pub fn assert_bad_request(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::BAD_REQUEST)
    }

    /// Assert the response status is Unauthorized (401)
    pub fn assert_unauthorized(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::UNAUTHORIZED)
    }

    /// Assert the response status is Not Found (404)
    pub fn assert_not_found(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::NOT_FOUND)
    }

    /// Assert the response status is Conflict (409)
    pub fn assert_conflict(&self) -> &Self {
        self.assert_status(axum::http::StatusCode::CONFLICT)
    }
}

/// Create a test configuration with a unique temporary SQLite database
pub fn test_config() -> AppConfig {
    let db_path = format!(
        "/tmp/opsdesk_test_{}.db",
        Uuid::new_v4().to_string().replace('-', "")
    );

    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            workers: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test_secret_key_that_is_at_least_32_bytes_long".to_string(),
            token_expiry_hours: 24,
            password_min_length: 8,
        },
        database: DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", db_path),
            max_connections: 1,
            connect_timeout_secs: 30,
        },
        logging: LoggingConfig::default(),
    }
}
