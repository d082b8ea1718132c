//! Health endpoint tests

use crate::common::TestApp;

#[tokio::test]
async fn health_endpoints_are_public() {
    let app = TestApp::new().await;

    let response = app.get_anon("/api/v1/health").await;
    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    app.get_anon("/api/v1/health/live").await.assert_ok();
    app.get_anon("/api/v1/health/ready").await.assert_ok();
}

#[tokio::test]
async fn detailed_health_reports_database_status() {
    let app = TestApp::new().await;

    let response = app.get_anon("/api/v1/health/detailed").await;
    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["components"]["database"]["status"], "healthy");
}
