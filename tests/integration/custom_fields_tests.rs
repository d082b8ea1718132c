//! Custom field definition tests

use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn create_and_list_definitions() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/custom-fields",
        json!({"module": "tickets", "name": "Severity", "fieldType": "Number", "required": true}),
        &session,
    )
    .await
    .assert_created();

    app.post_json(
        "/api/v1/custom-fields",
        json!({"module": "assets", "name": "Row", "fieldType": "Text"}),
        &session,
    )
    .await
    .assert_created();

    let all: Vec<serde_json::Value> = app.get("/api/v1/custom-fields", &session).await.json();
    assert_eq!(all.len(), 2);

    let ticket_fields: Vec<serde_json::Value> = app
        .get("/api/v1/custom-fields?module=tickets", &session)
        .await
        .json();
    assert_eq!(ticket_fields.len(), 1);
    assert_eq!(ticket_fields[0]["name"], "Severity");
    assert_eq!(ticket_fields[0]["required"], true);
}

#[tokio::test]
async fn dropdown_requires_options() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/custom-fields",
        json!({"module": "tickets", "name": "Tier", "fieldType": "Dropdown"}),
        &session,
    )
    .await
    .assert_bad_request();

    app.post_json(
        "/api/v1/custom-fields",
        json!({
            "module": "tickets",
            "name": "Tier",
            "fieldType": "Dropdown",
            "options": ["Gold", "Silver"],
        }),
        &session,
    )
    .await
    .assert_created();
}

#[tokio::test]
async fn inventory_module_does_not_support_custom_fields() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/custom-fields",
        json!({"module": "inventory", "name": "Shelf", "fieldType": "Text"}),
        &session,
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn duplicate_name_per_module_conflicts() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/custom-fields",
        json!({"module": "tickets", "name": "Severity", "fieldType": "Number"}),
        &session,
    )
    .await
    .assert_created();

    app.post_json(
        "/api/v1/custom-fields",
        json!({"module": "tickets", "name": "Severity", "fieldType": "Text"}),
        &session,
    )
    .await
    .assert_conflict();

    // Same name on another module is allowed
    app.post_json(
        "/api/v1/custom-fields",
        json!({"module": "assets", "name": "Severity", "fieldType": "Number"}),
        &session,
    )
    .await
    .assert_created();
}

#[tokio::test]
async fn update_and_delete_definition() {
    let (app, session) = TestApp::with_session().await;

    let created: serde_json::Value = app
        .post_json(
            "/api/v1/custom-fields",
            json!({
                "module": "tickets",
                "name": "Tier",
                "fieldType": "Dropdown",
                "options": ["Gold"],
            }),
            &session,
        )
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/v1/custom-fields/{}", id),
            json!({"options": ["Gold", "Silver", "Bronze"], "required": true}),
            &session,
        )
        .await;
    response.assert_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["required"], true);
    assert_eq!(updated["options"].as_array().unwrap().len(), 3);

    app.delete(&format!("/api/v1/custom-fields/{}", id), &session)
        .await
        .assert_ok();
    app.get(&format!("/api/v1/custom-fields/{}", id), &session)
        .await
        .assert_not_found();
}
