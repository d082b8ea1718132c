//! Audit trail tests

use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn mutations_leave_audit_entries() {
    let (app, session) = TestApp::with_session().await;

    let ticket: serde_json::Value = app
        .post_json(
            "/api/v1/tickets",
            json!({"title": "Printer down", "client": "Acme", "status": "Open"}),
            &session,
        )
        .await
        .json();

    let entries: Vec<serde_json::Value> = app
        .get("/api/v1/audit-logs?action=ticket.create", &session)
        .await
        .json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["resource_type"], "tickets");
    assert_eq!(
        entries[0]["resource_id"],
        ticket["id"].as_str().unwrap()
    );
    assert_eq!(entries[0]["user_id"], session.user_id.to_string());
}

#[tokio::test]
async fn setup_and_login_are_audited() {
    let (app, session) = TestApp::with_session().await;

    app.post_json_anon(
        "/api/v1/auth/login",
        json!({"username": session.username, "password": "correct-horse-battery"}),
    )
    .await
    .assert_ok();

    let logins: Vec<serde_json::Value> = app
        .get("/api/v1/audit-logs?action=auth.login", &session)
        .await
        .json();
    assert_eq!(logins.len(), 1);

    let setups: Vec<serde_json::Value> = app
        .get("/api/v1/audit-logs?action=auth.setup_user", &session)
        .await
        .json();
    assert_eq!(setups.len(), 1);
}

#[tokio::test]
async fn limit_caps_the_listing() {
    let (app, session) = TestApp::with_session().await;

    for i in 0..5 {
        app.post_json(
            "/api/v1/tickets",
            json!({"title": format!("T{}", i), "client": "Acme", "status": "Open"}),
            &session,
        )
        .await
        .assert_created();
    }

    let entries: Vec<serde_json::Value> = app
        .get("/api/v1/audit-logs?action=ticket.create&limit=3", &session)
        .await
        .json();
    assert_eq!(entries.len(), 3);
}

#[tokio::test]
async fn audit_log_is_tenant_scoped() {
    let (app, session) = TestApp::with_session().await;
    let other = app.setup_tenant("globex").await;

    app.post_json(
        "/api/v1/tickets",
        json!({"title": "Acme ticket", "client": "Acme", "status": "Open"}),
        &session,
    )
    .await
    .assert_created();

    let entries: Vec<serde_json::Value> = app
        .get("/api/v1/audit-logs?action=ticket.create", &other)
        .await
        .json();
    assert!(entries.is_empty());
}
