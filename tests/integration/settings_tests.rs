//! Settings registry tests: CRUD, duplicate guards, and in-use tracking

use serde_json::json;

use crate::common::{TestApp, TestSession};

async fn in_use_count(app: &TestApp, session: &TestSession, id: &str) -> i64 {
    let item: serde_json::Value = app
        .get(&format!("/api/v1/settings/tickets/{}", id), session)
        .await
        .json();
    item["inUseCount"].as_i64().unwrap()
}

#[tokio::test]
async fn create_and_list_settings() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/settings/tickets",
        json!({"kind": "status", "name": "Open", "variant": "blue"}),
        &session,
    )
    .await
    .assert_created();

    app.post_json(
        "/api/v1/settings/tickets",
        json!({"kind": "queue", "name": "Helpdesk"}),
        &session,
    )
    .await
    .assert_created();

    let response = app.get("/api/v1/settings/tickets", &session).await;
    response.assert_ok();
    let items: Vec<serde_json::Value> = response.json();
    assert_eq!(items.len(), 2);

    // Kind filter narrows the listing
    let response = app
        .get("/api/v1/settings/tickets?kind=status", &session)
        .await;
    let items: Vec<serde_json::Value> = response.json();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Open");
    assert_eq!(items[0]["variant"], "blue");
    assert_eq!(items[0]["inUseCount"], 0);
}

#[tokio::test]
async fn duplicate_name_within_kind_conflicts() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/settings/tickets",
        json!({"kind": "status", "name": "Open"}),
        &session,
    )
    .await
    .assert_created();

    app.post_json(
        "/api/v1/settings/tickets",
        json!({"kind": "status", "name": "Open"}),
        &session,
    )
    .await
    .assert_conflict();

    // Same name under a different kind is fine
    app.post_json(
        "/api/v1/settings/tickets",
        json!({"kind": "queue", "name": "Open"}),
        &session,
    )
    .await
    .assert_created();
}

#[tokio::test]
async fn unknown_module_is_rejected() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/settings/payroll",
        json!({"kind": "status", "name": "Open"}),
        &session,
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn update_renames_and_guards_collisions() {
    let (app, session) = TestApp::with_session().await;

    let created: serde_json::Value = app
        .post_json(
            "/api/v1/settings/tickets",
            json!({"kind": "status", "name": "Open"}),
            &session,
        )
        .await
        .json();
    app.post_json(
        "/api/v1/settings/tickets",
        json!({"kind": "status", "name": "Closed"}),
        &session,
    )
    .await
    .assert_created();

    let id = created["id"].as_str().unwrap();

    // Renaming onto an existing live name conflicts
    app.put_json(
        &format!("/api/v1/settings/tickets/{}", id),
        json!({"name": "Closed"}),
        &session,
    )
    .await
    .assert_conflict();

    let response = app
        .put_json(
            &format!("/api/v1/settings/tickets/{}", id),
            json!({"name": "Reopened", "variant": "orange"}),
            &session,
        )
        .await;
    response.assert_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["name"], "Reopened");
    assert_eq!(updated["variant"], "orange");
}

#[tokio::test]
async fn delete_removes_unused_setting() {
    let (app, session) = TestApp::with_session().await;

    let created: serde_json::Value = app
        .post_json(
            "/api/v1/settings/tickets",
            json!({"kind": "status", "name": "Open"}),
            &session,
        )
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = app
        .delete(&format!("/api/v1/settings/tickets/{}", id), &session)
        .await;
    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["deleted"], true);

    app.get(&format!("/api/v1/settings/tickets/{}", id), &session)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn counters_follow_status_and_queue_changes() {
    let (app, session) = TestApp::with_session().await;

    let mut ids = std::collections::HashMap::new();
    for (kind, name) in [
        ("status", "Open"),
        ("status", "Closed"),
        ("queue", "Helpdesk"),
        ("queue", "Escalations"),
    ] {
        let created: serde_json::Value = app
            .post_json(
                "/api/v1/settings/tickets",
                json!({"kind": kind, "name": name}),
                &session,
            )
            .await
            .json();
        ids.insert(name, created["id"].as_str().unwrap().to_string());
    }

    let ticket: serde_json::Value = app
        .post_json(
            "/api/v1/tickets",
            json!({"title": "T", "client": "Acme", "status": "Open", "queue": "Helpdesk"}),
            &session,
        )
        .await
        .json();
    let ticket_uri = format!("/api/v1/tickets/{}", ticket["id"].as_str().unwrap());

    assert_eq!(in_use_count(&app, &session, &ids["Open"]).await, 1);
    assert_eq!(in_use_count(&app, &session, &ids["Helpdesk"]).await, 1);

    // Changing status releases the old reference and takes the new one
    app.put_json(&ticket_uri, json!({"status": "Closed"}), &session)
        .await
        .assert_ok();
    assert_eq!(in_use_count(&app, &session, &ids["Open"]).await, 0);
    assert_eq!(in_use_count(&app, &session, &ids["Closed"]).await, 1);

    app.put_json(&ticket_uri, json!({"queue": "Escalations"}), &session)
        .await
        .assert_ok();
    assert_eq!(in_use_count(&app, &session, &ids["Helpdesk"]).await, 0);
    assert_eq!(in_use_count(&app, &session, &ids["Escalations"]).await, 1);

    // An update that leaves status and queue alone shifts nothing
    app.put_json(&ticket_uri, json!({"assignee": "kim"}), &session)
        .await
        .assert_ok();
    assert_eq!(in_use_count(&app, &session, &ids["Closed"]).await, 1);
    assert_eq!(in_use_count(&app, &session, &ids["Escalations"]).await, 1);

    app.delete(&ticket_uri, &session).await.assert_ok();
    assert_eq!(in_use_count(&app, &session, &ids["Closed"]).await, 0);
    assert_eq!(in_use_count(&app, &session, &ids["Escalations"]).await, 0);
}

#[tokio::test]
async fn in_use_setting_cannot_be_deleted() {
    let (app, session) = TestApp::with_session().await;

    let created: serde_json::Value = app
        .post_json(
            "/api/v1/settings/tickets",
            json!({"kind": "status", "name": "Open"}),
            &session,
        )
        .await
        .json();
    let setting_id = created["id"].as_str().unwrap();

    let ticket: serde_json::Value = app
        .post_json(
            "/api/v1/tickets",
            json!({"title": "Printer down", "client": "Acme", "status": "Open"}),
            &session,
        )
        .await
        .json();

    // The ticket reference is counted against the status
    let fetched: serde_json::Value = app
        .get(&format!("/api/v1/settings/tickets/{}", setting_id), &session)
        .await
        .json();
    assert_eq!(fetched["inUseCount"], 1);

    app.delete(&format!("/api/v1/settings/tickets/{}", setting_id), &session)
        .await
        .assert_conflict();

    // Releasing the reference unblocks deletion
    app.delete(
        &format!("/api/v1/tickets/{}", ticket["id"].as_str().unwrap()),
        &session,
    )
    .await
    .assert_ok();

    let fetched: serde_json::Value = app
        .get(&format!("/api/v1/settings/tickets/{}", setting_id), &session)
        .await
        .json();
    assert_eq!(fetched["inUseCount"], 0);

    app.delete(&format!("/api/v1/settings/tickets/{}", setting_id), &session)
        .await
        .assert_ok();
}
