//! Ticket API tests

use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn ticket_round_trip() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .post_json(
            "/api/v1/tickets",
            json!({
                "title": "Mail server unreachable",
                "description": "SMTP timeouts since 09:00",
                "client": "Acme",
                "status": "Open",
                "priority": "High",
                "queue": "Helpdesk",
            }),
            &session,
        )
        .await;
    response.assert_created();
    let created: serde_json::Value = response.json();
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["status"], "Open");
    assert_eq!(created["queue"], "Helpdesk");

    let fetched: serde_json::Value = app
        .get(&format!("/api/v1/tickets/{}", id), &session)
        .await
        .json();
    assert_eq!(fetched["title"], "Mail server unreachable");

    let response = app
        .put_json(
            &format!("/api/v1/tickets/{}", id),
            json!({"status": "Closed", "assignee": "kim"}),
            &session,
        )
        .await;
    response.assert_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["status"], "Closed");
    assert_eq!(updated["assignee"], "kim");
    // Untouched fields survive a partial update
    assert_eq!(updated["priority"], "High");

    app.delete(&format!("/api/v1/tickets/{}", id), &session)
        .await
        .assert_ok();
    app.get(&format!("/api/v1/tickets/{}", id), &session)
        .await
        .assert_not_found();

    let listed: Vec<serde_json::Value> = app.get("/api/v1/tickets", &session).await.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn empty_status_is_rejected() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/tickets",
        json!({"title": "No status", "client": "Acme", "status": "  "}),
        &session,
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn list_filters_are_conjunctive() {
    let (app, session) = TestApp::with_session().await;

    for (title, client, status, priority) in [
        ("A", "Acme", "Open", "High"),
        ("B", "Acme", "Closed", "High"),
        ("C", "Globex", "Open", "Low"),
        ("D", "Acme", "Pending", "Low"),
    ] {
        app.post_json(
            "/api/v1/tickets",
            json!({"title": title, "client": client, "status": status, "priority": priority}),
            &session,
        )
        .await
        .assert_created();
    }

    // Comma-separated status values expand to an IN clause
    let open_or_pending: Vec<serde_json::Value> = app
        .get("/api/v1/tickets?status=Open,Pending", &session)
        .await
        .json();
    assert_eq!(open_or_pending.len(), 3);

    let acme_open: Vec<serde_json::Value> = app
        .get("/api/v1/tickets?status=Open&client=Acme", &session)
        .await
        .json();
    assert_eq!(acme_open.len(), 1);
    assert_eq!(acme_open[0]["title"], "A");

    let high: Vec<serde_json::Value> = app
        .get("/api/v1/tickets?priority=High", &session)
        .await
        .json();
    assert_eq!(high.len(), 2);
}

#[tokio::test]
async fn search_matches_title_and_client() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/tickets",
        json!({"title": "VPN flapping", "client": "Initech", "status": "Open"}),
        &session,
    )
    .await
    .assert_created();
    app.post_json(
        "/api/v1/tickets",
        json!({"title": "Password reset", "client": "Acme", "status": "Open"}),
        &session,
    )
    .await
    .assert_created();

    let by_title: Vec<serde_json::Value> =
        app.get("/api/v1/tickets/search?q=vpn", &session).await.json();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0]["title"], "VPN flapping");

    let by_client: Vec<serde_json::Value> = app
        .get("/api/v1/tickets/search?q=initech", &session)
        .await
        .json();
    assert_eq!(by_client.len(), 1);
}

#[tokio::test]
async fn custom_field_values_are_validated_on_write() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/custom-fields",
        json!({"module": "tickets", "name": "Severity", "fieldType": "Number", "required": true}),
        &session,
    )
    .await
    .assert_created();

    // Unknown key
    app.post_json(
        "/api/v1/tickets",
        json!({
            "title": "T", "client": "Acme", "status": "Open",
            "customFields": {"Color": "red"},
        }),
        &session,
    )
    .await
    .assert_bad_request();

    // Wrong type for a declared field
    app.post_json(
        "/api/v1/tickets",
        json!({
            "title": "T", "client": "Acme", "status": "Open",
            "customFields": {"Severity": "very"},
        }),
        &session,
    )
    .await
    .assert_bad_request();

    let response = app
        .post_json(
            "/api/v1/tickets",
            json!({
                "title": "T", "client": "Acme", "status": "Open",
                "customFields": {"Severity": 3},
            }),
            &session,
        )
        .await;
    response.assert_created();
    let created: serde_json::Value = response.json();
    assert_eq!(created["customFields"]["Severity"], 3);
}

#[tokio::test]
async fn tenants_do_not_see_each_others_tickets() {
    let (app, session) = TestApp::with_session().await;
    let other = app.setup_tenant("globex").await;

    let created: serde_json::Value = app
        .post_json(
            "/api/v1/tickets",
            json!({"title": "Acme only", "client": "Acme", "status": "Open"}),
            &session,
        )
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    app.get(&format!("/api/v1/tickets/{}", id), &other)
        .await
        .assert_not_found();
    let listed: Vec<serde_json::Value> = app.get("/api/v1/tickets", &other).await.json();
    assert!(listed.is_empty());
}
