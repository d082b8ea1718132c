//! Authentication and tenant bootstrap tests

use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn setup_user_creates_tenant_and_issues_token() {
    let (app, session) = TestApp::with_session().await;

    let response = app.get("/api/v1/auth/me", &session).await;
    response.assert_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["username"], session.username);
    assert_eq!(body["role"], "admin");
    assert_eq!(
        body["organizationId"],
        session.organization_id.to_string()
    );
}

#[tokio::test]
async fn login_returns_token_for_valid_credentials() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .post_json_anon(
            "/api/v1/auth/login",
            json!({
                "username": session.username,
                "password": "correct-horse-battery",
            }),
        )
        .await;
    response.assert_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["tokenType"], "Bearer");
    assert!(body["accessToken"].as_str().unwrap().len() > 20);
    assert_eq!(body["user"]["username"], session.username);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .post_json_anon(
            "/api/v1/auth/login",
            json!({
                "username": session.username,
                "password": "not-the-password",
            }),
        )
        .await;
    response.assert_unauthorized();
}

#[tokio::test]
async fn login_rejects_unknown_user() {
    let app = TestApp::new().await;

    let response = app
        .post_json_anon(
            "/api/v1/auth/login",
            json!({"username": "ghost", "password": "whatever-pass"}),
        )
        .await;
    response.assert_unauthorized();
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = TestApp::new().await;

    app.get_anon("/api/v1/tickets").await.assert_unauthorized();
    app.get_anon("/api/v1/organizations/current")
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn requests_with_garbage_token_are_rejected() {
    let (app, _session) = TestApp::with_session().await;

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/v1/tickets")
        .header("Authorization", "Bearer not.a.jwt")
        .body(axum::body::Body::empty())
        .unwrap();
    app.request(request).await.assert_unauthorized();
}

#[tokio::test]
async fn setup_user_rejects_duplicate_subdomain() {
    let (app, _session) = TestApp::with_session().await;

    let response = app
        .post_json_anon(
            "/api/v1/auth/setup-user",
            json!({
                "organizationName": "Other Inc",
                "subdomain": "acme",
                "username": "other-admin",
                "email": "admin@other.example.com",
                "password": "correct-horse-battery",
            }),
        )
        .await;
    response.assert_conflict();
}

#[tokio::test]
async fn setup_user_rejects_invalid_subdomain() {
    let app = TestApp::new().await;

    let response = app
        .post_json_anon(
            "/api/v1/auth/setup-user",
            json!({
                "organizationName": "Bad Inc",
                "subdomain": "Not A Subdomain!",
                "username": "bad-admin",
                "email": "admin@bad.example.com",
                "password": "correct-horse-battery",
            }),
        )
        .await;
    response.assert_bad_request();
}

#[tokio::test]
async fn setup_user_rejects_short_password() {
    let app = TestApp::new().await;

    let response = app
        .post_json_anon(
            "/api/v1/auth/setup-user",
            json!({
                "organizationName": "Short Inc",
                "subdomain": "short",
                "username": "short-admin",
                "email": "admin@short.example.com",
                "password": "tiny",
            }),
        )
        .await;
    response.assert_bad_request();
}
