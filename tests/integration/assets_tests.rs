//! Asset API tests

use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn asset_round_trip() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .post_json(
            "/api/v1/assets",
            json!({
                "name": "db-01",
                "client": "Acme",
                "type": "Server",
                "status": "Online",
                "isSecure": true,
                "serialNumber": "SN-1234",
            }),
            &session,
        )
        .await;
    response.assert_created();
    let created: serde_json::Value = response.json();
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["type"], "Server");
    assert_eq!(created["isSecure"], true);

    let response = app
        .put_json(
            &format!("/api/v1/assets/{}", id),
            json!({"status": "Warning", "notes": "Disk SMART errors"}),
            &session,
        )
        .await;
    response.assert_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["status"], "Warning");
    assert_eq!(updated["serialNumber"], "SN-1234");

    app.delete(&format!("/api/v1/assets/{}", id), &session)
        .await
        .assert_ok();
    app.get(&format!("/api/v1/assets/{}", id), &session)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn unknown_enum_values_are_rejected_with_allowed_list() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .post_json(
            "/api/v1/assets",
            json!({"name": "x", "client": "Acme", "type": "Mainframe", "status": "Online"}),
            &session,
        )
        .await;
    response.assert_bad_request();
    assert!(response.text().contains("Workstation"));

    let response = app
        .post_json(
            "/api/v1/assets",
            json!({"name": "x", "client": "Acme", "type": "Server", "status": "Sleeping"}),
            &session,
        )
        .await;
    response.assert_bad_request();
    assert!(response.text().contains("Online"));
}

#[tokio::test]
async fn list_filters_by_type_and_status() {
    let (app, session) = TestApp::with_session().await;

    for (name, kind, status) in [
        ("srv-1", "Server", "Online"),
        ("srv-2", "Server", "Offline"),
        ("sw-1", "Network", "Online"),
        ("ws-1", "Workstation", "Online"),
    ] {
        app.post_json(
            "/api/v1/assets",
            json!({"name": name, "client": "Acme", "type": kind, "status": status}),
            &session,
        )
        .await
        .assert_created();
    }

    let servers_and_network: Vec<serde_json::Value> = app
        .get("/api/v1/assets?type=Server,Network", &session)
        .await
        .json();
    assert_eq!(servers_and_network.len(), 3);

    let online_servers: Vec<serde_json::Value> = app
        .get("/api/v1/assets?type=Server&status=Online", &session)
        .await
        .json();
    assert_eq!(online_servers.len(), 1);
    assert_eq!(online_servers[0]["name"], "srv-1");
}

#[tokio::test]
async fn search_matches_serial_number() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/assets",
        json!({
            "name": "printer-3", "client": "Acme", "type": "Printer",
            "status": "Online", "serialNumber": "XJ-900",
        }),
        &session,
    )
    .await
    .assert_created();

    let hits: Vec<serde_json::Value> = app
        .get("/api/v1/assets/search?q=xj-900", &session)
        .await
        .json();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "printer-3");
}
