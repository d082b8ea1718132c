//! Inventory API tests: stock tracking, adjustments, and asset deployment

use serde_json::json;

use crate::common::TestApp;

async fn create_item(
    app: &TestApp,
    session: &crate::common::TestSession,
    sku: &str,
    quantity: i64,
) -> serde_json::Value {
    let response = app
        .post_json(
            "/api/v1/inventory",
            json!({
                "sku": sku,
                "name": "ThinkPad T14",
                "category": "Hardware",
                "quantity": quantity,
                "reorderPoint": 2,
                "warrantyInfo": "3y onsite",
                "purchaseInfo": "PO-7741",
            }),
            session,
        )
        .await;
    response.assert_created();
    response.json()
}

#[tokio::test]
async fn item_round_trip() {
    let (app, session) = TestApp::with_session().await;

    let created = create_item(&app, &session, "LT-100", 5).await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["quantity"], 5);
    assert_eq!(created["category"], "Hardware");

    let response = app
        .put_json(
            &format!("/api/v1/inventory/{}", id),
            json!({"location": "Shelf B3", "reorderPoint": 1}),
            &session,
        )
        .await;
    response.assert_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["location"], "Shelf B3");
    assert_eq!(updated["quantity"], 5);

    app.delete(&format!("/api/v1/inventory/{}", id), &session)
        .await
        .assert_ok();
    app.get(&format!("/api/v1/inventory/{}", id), &session)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn duplicate_sku_conflicts() {
    let (app, session) = TestApp::with_session().await;

    create_item(&app, &session, "LT-100", 5).await;
    app.post_json(
        "/api/v1/inventory",
        json!({"sku": "LT-100", "name": "Other", "category": "Hardware"}),
        &session,
    )
    .await
    .assert_conflict();
}

#[tokio::test]
async fn negative_initial_quantity_is_rejected() {
    let (app, session) = TestApp::with_session().await;

    app.post_json(
        "/api/v1/inventory",
        json!({"sku": "LT-101", "name": "X", "category": "Hardware", "quantity": -1}),
        &session,
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let (app, session) = TestApp::with_session().await;

    let response = app
        .post_json(
            "/api/v1/inventory",
            json!({"sku": "LT-102", "name": "X", "category": "Furniture"}),
            &session,
        )
        .await;
    response.assert_bad_request();
    assert!(response.text().contains("Hardware"));
}

#[tokio::test]
async fn adjust_stock_applies_delta_with_reason() {
    let (app, session) = TestApp::with_session().await;

    let created = create_item(&app, &session, "LT-100", 5).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .post_json(
            &format!("/api/v1/inventory/{}/adjust-stock", id),
            json!({"delta": 3, "reason": "Restock delivery"}),
            &session,
        )
        .await;
    response.assert_ok();
    let adjusted: serde_json::Value = response.json();
    assert_eq!(adjusted["quantity"], 8);

    let response = app
        .post_json(
            &format!("/api/v1/inventory/{}/adjust-stock", id),
            json!({"delta": -8, "reason": "Cycle count correction"}),
            &session,
        )
        .await;
    response.assert_ok();
    let adjusted: serde_json::Value = response.json();
    assert_eq!(adjusted["quantity"], 0);
}

#[tokio::test]
async fn adjust_stock_cannot_go_negative() {
    let (app, session) = TestApp::with_session().await;

    let created = create_item(&app, &session, "LT-100", 2).await;
    let id = created["id"].as_str().unwrap();

    app.post_json(
        &format!("/api/v1/inventory/{}/adjust-stock", id),
        json!({"delta": -3, "reason": "Oops"}),
        &session,
    )
    .await
    .assert_bad_request();

    // Quantity is untouched by the failed adjustment
    let fetched: serde_json::Value = app
        .get(&format!("/api/v1/inventory/{}", id), &session)
        .await
        .json();
    assert_eq!(fetched["quantity"], 2);
}

#[tokio::test]
async fn adjust_stock_requires_reason() {
    let (app, session) = TestApp::with_session().await;

    let created = create_item(&app, &session, "LT-100", 2).await;
    let id = created["id"].as_str().unwrap();

    app.post_json(
        &format!("/api/v1/inventory/{}/adjust-stock", id),
        json!({"delta": 1, "reason": "  "}),
        &session,
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn deploy_asset_consumes_one_unit() {
    let (app, session) = TestApp::with_session().await;

    let created = create_item(&app, &session, "LT-100", 1).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .post_json(
            &format!("/api/v1/inventory/{}/deploy-asset", id),
            json!({"assetName": "kim-laptop", "client": "Acme"}),
            &session,
        )
        .await;
    response.assert_created();
    let body: serde_json::Value = response.json();

    assert_eq!(body["inventoryItem"]["quantity"], 0);
    assert_eq!(body["asset"]["name"], "kim-laptop");
    assert_eq!(body["asset"]["type"], "Workstation");
    assert_eq!(body["asset"]["sourceInventoryId"], id);
    // Warranty and purchase details ride along on the asset
    let notes = body["asset"]["notes"].as_str().unwrap();
    assert!(notes.contains("3y onsite"));
    assert!(notes.contains("PO-7741"));

    let assets: Vec<serde_json::Value> = app.get("/api/v1/assets", &session).await.json();
    assert_eq!(assets.len(), 1);
}

#[tokio::test]
async fn deploy_asset_fails_when_out_of_stock() {
    let (app, session) = TestApp::with_session().await;

    let created = create_item(&app, &session, "LT-100", 0).await;
    let id = created["id"].as_str().unwrap();

    app.post_json(
        &format!("/api/v1/inventory/{}/deploy-asset", id),
        json!({"assetName": "kim-laptop"}),
        &session,
    )
    .await
    .assert_conflict();

    // Nothing was consumed and no asset was created
    let fetched: serde_json::Value = app
        .get(&format!("/api/v1/inventory/{}", id), &session)
        .await
        .json();
    assert_eq!(fetched["quantity"], 0);
    let assets: Vec<serde_json::Value> = app.get("/api/v1/assets", &session).await.json();
    assert!(assets.is_empty());
}

#[tokio::test]
async fn low_stock_filter_uses_reorder_point() {
    let (app, session) = TestApp::with_session().await;

    create_item(&app, &session, "LT-100", 1).await; // reorder point 2
    create_item(&app, &session, "LT-200", 10).await;

    let low: Vec<serde_json::Value> = app
        .get("/api/v1/inventory?low_stock=true", &session)
        .await
        .json();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0]["sku"], "LT-100");
}
