//! Project API tests

use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn project_round_trip() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .post_json(
            "/api/v1/projects",
            json!({
                "name": "Office move",
                "client": "Acme",
                "owner": "kim",
            }),
            &session,
        )
        .await;
    response.assert_created();
    let created: serde_json::Value = response.json();
    let id = created["id"].as_str().unwrap();
    // Status defaults when omitted
    assert_eq!(created["status"], "Planning");

    let response = app
        .put_json(
            &format!("/api/v1/projects/{}", id),
            json!({"status": "In Progress", "description": "Phase 1 underway"}),
            &session,
        )
        .await;
    response.assert_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["status"], "In Progress");
    assert_eq!(updated["owner"], "kim");

    app.delete(&format!("/api/v1/projects/{}", id), &session)
        .await
        .assert_ok();
    app.get(&format!("/api/v1/projects/{}", id), &session)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn empty_status_update_is_rejected() {
    let (app, session) = TestApp::with_session().await;

    let created: serde_json::Value = app
        .post_json(
            "/api/v1/projects",
            json!({"name": "Office move"}),
            &session,
        )
        .await
        .json();

    app.put_json(
        &format!("/api/v1/projects/{}", created["id"].as_str().unwrap()),
        json!({"status": " "}),
        &session,
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn list_filters_and_search() {
    let (app, session) = TestApp::with_session().await;

    for (name, client, owner) in [
        ("Office move", "Acme", "kim"),
        ("Network refresh", "Acme", "lee"),
        ("Cloud migration", "Globex", "kim"),
    ] {
        app.post_json(
            "/api/v1/projects",
            json!({"name": name, "client": client, "owner": owner}),
            &session,
        )
        .await
        .assert_created();
    }

    let kim_acme: Vec<serde_json::Value> = app
        .get("/api/v1/projects?client=Acme&owner=kim", &session)
        .await
        .json();
    assert_eq!(kim_acme.len(), 1);
    assert_eq!(kim_acme[0]["name"], "Office move");

    let hits: Vec<serde_json::Value> = app
        .get("/api/v1/projects/search?q=migration", &session)
        .await
        .json();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["client"], "Globex");
}
