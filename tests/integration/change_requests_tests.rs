//! Change request lifecycle tests

use serde_json::json;

use crate::common::{TestApp, TestSession};

async fn create_change(app: &TestApp, session: &TestSession) -> serde_json::Value {
    let response = app
        .post_json(
            "/api/v1/change-requests",
            json!({
                "title": "Replace core switch",
                "client": "Acme",
                "riskLevel": "High",
                "impact": "High",
                "submittedBy": "kim",
                "changePlan": "Swap hardware during maintenance window",
                "rollbackPlan": "Reinstall old switch",
            }),
            session,
        )
        .await;
    response.assert_created();
    response.json()
}

#[tokio::test]
async fn new_change_requests_start_pending() {
    let (app, session) = TestApp::with_session().await;

    let created = create_change(&app, &session).await;
    assert_eq!(created["status"], "Pending Approval");
    assert!(created.get("approvedBy").is_none() || created["approvedBy"].is_null());
}

#[tokio::test]
async fn unknown_risk_level_is_rejected() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .post_json(
            "/api/v1/change-requests",
            json!({
                "title": "x", "client": "Acme",
                "riskLevel": "Extreme", "impact": "Low", "submittedBy": "kim",
            }),
            &session,
        )
        .await;
    response.assert_bad_request();
    assert!(response.text().contains("Critical"));
}

#[tokio::test]
async fn approve_records_decision() {
    let (app, session) = TestApp::with_session().await;

    let created = create_change(&app, &session).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .post_json(
            &format!("/api/v1/change-requests/{}/approve", id),
            json!({}),
            &session,
        )
        .await;
    response.assert_ok();
    let approved: serde_json::Value = response.json();
    assert_eq!(approved["status"], "Approved");
    // Defaults to the acting user when no approver name is given
    assert_eq!(approved["approvedBy"], session.username);
    assert!(approved["approvedAt"].is_string());

    // A decided request cannot be decided again
    app.post_json(
        &format!("/api/v1/change-requests/{}/approve", id),
        json!({}),
        &session,
    )
    .await
    .assert_conflict();
    app.post_json(
        &format!("/api/v1/change-requests/{}/reject", id),
        json!({"reason": "Too risky"}),
        &session,
    )
    .await
    .assert_conflict();
}

#[tokio::test]
async fn reject_requires_a_reason() {
    let (app, session) = TestApp::with_session().await;

    let created = create_change(&app, &session).await;
    let id = created["id"].as_str().unwrap();

    app.post_json(
        &format!("/api/v1/change-requests/{}/reject", id),
        json!({"reason": ""}),
        &session,
    )
    .await
    .assert_bad_request();

    let response = app
        .post_json(
            &format!("/api/v1/change-requests/{}/reject", id),
            json!({"rejectedBy": "cab", "reason": "Insufficient rollback plan"}),
            &session,
        )
        .await;
    response.assert_ok();
    let rejected: serde_json::Value = response.json();
    assert_eq!(rejected["status"], "Rejected");
    assert_eq!(rejected["rejectedBy"], "cab");
    assert_eq!(rejected["rejectionReason"], "Insufficient rollback plan");
}

#[tokio::test]
async fn put_cannot_make_approval_decisions() {
    let (app, session) = TestApp::with_session().await;

    let created = create_change(&app, &session).await;
    let id = created["id"].as_str().unwrap();

    app.put_json(
        &format!("/api/v1/change-requests/{}", id),
        json!({"status": "Approved"}),
        &session,
    )
    .await
    .assert_conflict();
    app.put_json(
        &format!("/api/v1/change-requests/{}", id),
        json!({"status": "Rejected"}),
        &session,
    )
    .await
    .assert_conflict();

    // Restating the current status is a no-op, not a decision
    app.put_json(
        &format!("/api/v1/change-requests/{}", id),
        json!({"status": "Pending Approval", "title": "Replace core switch (v2)"}),
        &session,
    )
    .await
    .assert_ok();
}

#[tokio::test]
async fn status_transitions_follow_the_lifecycle() {
    let (app, session) = TestApp::with_session().await;

    let created = create_change(&app, &session).await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/change-requests/{}", id);

    // Pending Approval cannot jump straight to In Progress
    app.put_json(&uri, json!({"status": "In Progress"}), &session)
        .await
        .assert_conflict();

    app.post_json(
        &format!("/api/v1/change-requests/{}/approve", id),
        json!({"approvedBy": "cab"}),
        &session,
    )
    .await
    .assert_ok();

    let response = app
        .put_json(&uri, json!({"status": "In Progress"}), &session)
        .await;
    response.assert_ok();

    app.put_json(&uri, json!({"status": "Completed"}), &session)
        .await
        .assert_ok();

    // Completed is terminal apart from cancellation
    app.put_json(&uri, json!({"status": "In Progress"}), &session)
        .await
        .assert_conflict();
    app.put_json(&uri, json!({"status": "Cancelled"}), &session)
        .await
        .assert_ok();
}

#[tokio::test]
async fn list_filters_by_status_and_risk() {
    let (app, session) = TestApp::with_session().await;

    let first = create_change(&app, &session).await;
    create_change_with_risk(&app, &session, "Low").await;

    app.post_json(
        &format!(
            "/api/v1/change-requests/{}/approve",
            first["id"].as_str().unwrap()
        ),
        json!({}),
        &session,
    )
    .await
    .assert_ok();

    let approved: Vec<serde_json::Value> = app
        .get("/api/v1/change-requests?status=Approved", &session)
        .await
        .json();
    assert_eq!(approved.len(), 1);

    let high_risk: Vec<serde_json::Value> = app
        .get("/api/v1/change-requests?risk_level=High,Critical", &session)
        .await
        .json();
    assert_eq!(high_risk.len(), 1);
}

async fn create_change_with_risk(app: &TestApp, session: &TestSession, risk: &str) {
    app.post_json(
        "/api/v1/change-requests",
        json!({
            "title": "Minor tweak",
            "client": "Acme",
            "riskLevel": risk,
            "impact": "Low",
            "submittedBy": "kim",
        }),
        session,
    )
    .await
    .assert_created();
}
