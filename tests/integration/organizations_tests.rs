//! Organization API tests

use serde_json::json;
use uuid::Uuid;

use crate::common::TestApp;

#[tokio::test]
async fn current_organization_reflects_session_tenant() {
    let (app, session) = TestApp::with_session().await;

    let response = app.get("/api/v1/organizations/current", &session).await;
    response.assert_ok();
    let org: serde_json::Value = response.json();
    assert_eq!(org["id"], session.organization_id.to_string());
    assert_eq!(org["subdomain"], "acme");
    // Every module starts enabled
    assert_eq!(org["enabledModules"]["tickets"], true);
}

#[tokio::test]
async fn admin_can_update_current_organization() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .put_json(
            "/api/v1/organizations/current",
            json!({
                "name": "Acme Renamed",
                "isInternalItMode": true,
                "enabledModules": {"tickets": true, "projects": false},
            }),
            &session,
        )
        .await;
    response.assert_ok();
    let org: serde_json::Value = response.json();
    assert_eq!(org["name"], "Acme Renamed");
    assert_eq!(org["isInternalItMode"], true);
    assert_eq!(org["enabledModules"]["projects"], false);
}

#[tokio::test]
async fn foreign_organization_is_invisible() {
    let (app, session) = TestApp::with_session().await;
    let other = app.setup_tenant("globex").await;

    // A tenant cannot see another tenant's organization, not even that it exists
    app.get(
        &format!("/api/v1/organizations/{}", other.organization_id),
        &session,
    )
    .await
    .assert_not_found();

    app.get(&format!("/api/v1/organizations/{}", Uuid::new_v4()), &session)
        .await
        .assert_not_found();

    // Its own id resolves normally
    app.get(
        &format!("/api/v1/organizations/{}", session.organization_id),
        &session,
    )
    .await
    .assert_ok();
}
