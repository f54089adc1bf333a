mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use mes_api::entities::enums::ItemType;
use serde_json::json;

/// S1: direct fulfillment when WS-7 already holds enough stock.
#[tokio::test]
async fn direct_fulfillment_completes_and_debits_plant_warehouse() {
    let app = TestApp::new().await;
    app.seed_product(1, "Widget").await;
    app.seed_stock(7, ItemType::Product, 1, 50).await;

    let create = app
        .request(Method::POST, "/customer-orders", Some(json!({"items": [{"product_id": 1, "requested_quantity": 2}]})))
        .await;
    assert_eq!(create.status(), StatusCode::OK);
    let created = TestApp::json_body(create).await;
    let id = created["id"].as_str().expect("order id").to_string();

    let confirm = app.request(Method::PUT, &format!("/customer-orders/{id}/confirm"), None).await;
    assert_eq!(confirm.status(), StatusCode::OK);
    let confirmed = TestApp::json_body(confirm).await;
    assert_eq!(confirmed["trigger_scenario"], "DirectFulfillment");

    let fulfill = app.request(Method::POST, &format!("/customer-orders/{id}/fulfill"), None).await;
    assert_eq!(fulfill.status(), StatusCode::OK);
    let fulfilled = TestApp::json_body(fulfill).await;
    assert_eq!(fulfilled["status"], "Completed");

    let stock = app
        .request(Method::GET, "/stock?workstation_id=7&item_type=Product&item_id=1", None)
        .await;
    let stock_body = TestApp::json_body(stock).await;
    assert_eq!(stock_body[0]["quantity"], 48);
}

/// S2: no product stock, modules available at WS-8 — warehouse order path.
#[tokio::test]
async fn warehouse_order_needed_when_product_stock_is_empty() {
    let app = TestApp::new().await;
    app.seed_product(1, "Widget").await;
    app.seed_module(10, "Frame", 4).await;
    app.seed_module(11, "Motor", 5).await;
    app.seed_bom_edge(ItemType::Product, 1, ItemType::Module, 10, 1).await;
    app.seed_bom_edge(ItemType::Product, 1, ItemType::Module, 11, 1).await;
    app.seed_stock(7, ItemType::Product, 1, 0).await;
    app.seed_stock(8, ItemType::Module, 10, 20).await;
    app.seed_stock(8, ItemType::Module, 11, 20).await;

    let create = app
        .request(Method::POST, "/customer-orders", Some(json!({"items": [{"product_id": 1, "requested_quantity": 2}]})))
        .await;
    let created = TestApp::json_body(create).await;
    let co_id = created["id"].as_str().unwrap().to_string();

    let confirm = app.request(Method::PUT, &format!("/customer-orders/{co_id}/confirm"), None).await;
    let confirmed = TestApp::json_body(confirm).await;
    assert_eq!(confirmed["trigger_scenario"], "WarehouseOrderNeeded");

    let fulfill_co = app.request(Method::POST, &format!("/customer-orders/{co_id}/fulfill"), None).await;
    assert_eq!(fulfill_co.status(), StatusCode::OK);
}

/// S5: an adjust that would drive a key negative is rejected without mutating stock.
#[tokio::test]
async fn adjust_rejects_when_it_would_go_negative() {
    let app = TestApp::new().await;
    app.seed_stock(7, ItemType::Product, 1, 5).await;

    let adjust = app
        .request(
            Method::POST,
            "/stock/adjust",
            Some(json!({
                "workstation_id": 7,
                "item_type": "Product",
                "item_id": 1,
                "delta": -10,
                "reason": "Adjustment"
            })),
        )
        .await;
    assert_eq!(adjust.status(), StatusCode::BAD_REQUEST);
    let body = TestApp::json_body(adjust).await;
    assert_eq!(body["error_code"], "INVENTORY_VALIDATION_ERROR");

    let stock = app.request(Method::GET, "/stock?workstation_id=7&item_type=Product&item_id=1", None).await;
    let stock_body = TestApp::json_body(stock).await;
    assert_eq!(stock_body[0]["quantity"], 5);
}

/// Re-confirming an already-confirmed order is rejected and does not mutate state.
#[tokio::test]
async fn reconfirming_customer_order_is_rejected() {
    let app = TestApp::new().await;
    app.seed_product(1, "Widget").await;
    app.seed_stock(7, ItemType::Product, 1, 50).await;

    let create = app
        .request(Method::POST, "/customer-orders", Some(json!({"items": [{"product_id": 1, "requested_quantity": 2}]})))
        .await;
    let created = TestApp::json_body(create).await;
    let id = created["id"].as_str().unwrap().to_string();

    let first = app.request(Method::PUT, &format!("/customer-orders/{id}/confirm"), None).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.request(Method::PUT, &format!("/customer-orders/{id}/confirm"), None).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body = TestApp::json_body(second).await;
    assert_eq!(body["error_code"], "ORDER_INVALID_STATE");
}
