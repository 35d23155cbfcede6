mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use futures::future::join;
use product::reconciler::SkipReason;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde_json::{Value, json};

fn money(value: &Value) -> Decimal {
    Decimal::from_f64(value.as_f64().unwrap()).unwrap().round_dp(2)
}

fn assert_total_invariant(order: &Value) {
    let expected = (money(&order["unitPrice"]) * Decimal::from(order["quantity"].as_i64().unwrap()))
        .round_dp(2);
    assert_eq!(money(&order["total"]), expected, "{order}");
}

#[tokio::test]
async fn order_lifecycle_moves_stock() {
    let mut app = TestApp::new();
    let widget = app.create_product("Widget", 9.99, "tools", 10.0).await;

    // create
    let (status, order) = app.create_order(&widget, 3).await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["total"].as_f64(), Some(29.97));
    assert_eq!(order["productName"], "Widget");
    assert_total_invariant(&order);
    assert_eq!(app.available(&widget).await, 10.0);

    let report = app.reconcile().await;
    assert_eq!(report.applied(), 1);
    assert_eq!(app.available(&widget).await, 7.0);

    // grow by 2 against 7 in stock
    let order_uri = format!("/orders/{}", order["id"].as_str().unwrap());
    let (status, body) = app
        .call(Method::PUT, &order_uri, Some(json!({ "quantity": 5 })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Order quantity updated successfully");
    assert_eq!(body["order"]["total"].as_f64(), Some(49.95));
    assert_eq!(body["order"]["unitPrice"].as_f64(), Some(9.99));
    assert_total_invariant(&body["order"]);

    let events = app.drain_events();
    assert_eq!(events[0].detail_type, "order.updated");
    assert_eq!(events[0].detail.as_ref().unwrap()["quantityDiff"], 2);
    app.reconciler.apply_batch(events).await;
    assert_eq!(app.available(&widget).await, 5.0);

    // delete gives the 5 back
    let (status, body) = app.call(Method::DELETE, &order_uri, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Order deleted successfully");
    assert_eq!(body["deletedOrder"]["quantity"], 5);

    app.reconcile().await;
    assert_eq!(app.available(&widget).await, 10.0);

    let (status, body) = app.get(&order_uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Order not found" }));
}

#[tokio::test]
async fn update_beyond_stock_is_rejected() {
    let mut app = TestApp::new();
    let widget = app.create_product("Widget", 9.99, "tools", 10.0).await;
    let (_, order) = app.create_order(&widget, 3).await;
    app.reconcile().await;

    let order_uri = format!("/orders/{}", order["id"].as_str().unwrap());
    let (status, body) = app
        .call(Method::PUT, &order_uri, Some(json!({ "quantity": 20 })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Not enough stock available. Only 7 left." })
    );
    assert!(app.drain_events().is_empty());

    let (_, stored) = app.get(&order_uri).await;
    assert_eq!(stored["quantity"], 3);
    assert_eq!(stored["total"].as_f64(), Some(29.97));
}

#[tokio::test]
async fn unchanged_quantity_is_a_no_op() {
    let mut app = TestApp::new();
    let widget = app.create_product("Widget", 2.5, "tools", 10.0).await;
    let (_, order) = app.create_order(&widget, 4).await;
    app.drain_events();

    let order_uri = format!("/orders/{}", order["id"].as_str().unwrap());
    let (status, body) = app
        .call(Method::PUT, &order_uri, Some(json!({ "quantity": 4 })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "No changes detected - quantity remains unchanged"
    );
    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn failed_order_leaves_no_record_and_no_event() {
    let mut app = TestApp::new();
    let widget = app.create_product("Widget", 9.99, "tools", 2.0).await;

    let (status, body) = app.create_order(&widget, 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Not enough stock available" }));

    let missing = json!({ "id": uuid::Uuid::new_v4(), "category": "tools" });
    let (status, body) = app.create_order(&missing, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Product not found" }));

    let (_, orders) = app.get("/orders").await;
    assert_eq!(orders, json!([]));
    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn orders_are_listed_newest_first() {
    let mut app = TestApp::new();
    let widget = app.create_product("Widget", 1.0, "tools", 100.0).await;

    let mut ids = Vec::new();
    for quantity in 1..=3 {
        let (_, order) = app.create_order(&widget, quantity).await;
        ids.push(order["id"].clone());
    }
    app.drain_events();

    let (status, orders) = app.get("/orders").await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<Value> = orders
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].clone())
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);
}

/// Two orders for the last units both pass the stock check because the
/// decrement lands later. Both orders exist; the guard lets only one
/// decrement through and stock never goes negative.
#[tokio::test]
async fn concurrent_orders_can_oversell() {
    let mut app = TestApp::new();
    let widget = app.create_product("Widget", 5.0, "tools", 5.0).await;

    let ((first, _), (second, _)) =
        join(app.create_order(&widget, 4), app.create_order(&widget, 4)).await;
    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CREATED);

    let report = app.reconcile().await;
    assert_eq!(report.applied(), 1);
    assert!(matches!(
        report.skip_reasons()[..],
        [SkipReason::ConditionFailed(_)]
    ));
    assert_eq!(app.available(&widget).await, 1.0);

    let (_, orders) = app.get("/orders").await;
    assert_eq!(orders.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stock_never_goes_negative() {
    let mut app = TestApp::new();
    let widget = app.create_product("Widget", 1.0, "tools", 3.0).await;

    for _ in 0..5 {
        let (status, _) = app.create_order(&widget, 2).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let report = app.reconcile().await;
    assert_eq!(report.applied(), 1);
    assert_eq!(report.skipped(), 4);
    assert_eq!(app.available(&widget).await, 1.0);
}

/// Redelivery is not deduplicated: the same event applied twice takes the
/// stock twice.
#[tokio::test]
async fn redelivered_created_event_double_decrements() {
    let mut app = TestApp::new();
    let widget = app.create_product("Widget", 1.0, "tools", 10.0).await;
    app.create_order(&widget, 5).await;

    let event = app.drain_events().remove(0);
    let report = app.reconciler.apply_batch(vec![event.clone(), event]).await;

    assert_eq!(report.applied(), 2);
    assert_eq!(app.available(&widget).await, 0.0);
}

#[tokio::test]
async fn category_aggregate_follows_products() {
    let app = TestApp::new();
    let a = app.create_product("Hammer", 12.0, "tools", 3.0).await;
    let b = app.create_product("Wrench", 8.0, "tools", 4.5).await;

    let (_, aggregate) = app
        .eventually("/categories/tools", |status, body| {
            status == StatusCode::OK && body["productIDs"].as_array().map(Vec::len) == Some(2)
        })
        .await;
    assert_eq!(aggregate["totalAvailability"].as_f64(), Some(7.5));
    assert_eq!(aggregate["id"], "CATEGORY");
    let created_at = aggregate["createdAt"].clone();

    let uri = format!("/products/tools/{}", a["id"].as_str().unwrap());
    let (status, _) = app
        .call(Method::PUT, &uri, Some(json!({ "available": 10 })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, aggregate) = app
        .eventually("/categories/tools", |_, body| {
            body["totalAvailability"].as_f64() == Some(14.5)
        })
        .await;
    assert_eq!(aggregate["createdAt"], created_at);

    for product in [&a, &b] {
        let uri = format!("/products/tools/{}", product["id"].as_str().unwrap());
        let (status, _) = app.call(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = app
        .eventually("/categories/tools", |status, _| status == StatusCode::NOT_FOUND)
        .await;
    assert_eq!(
        body,
        json!({ "error": "Aggregate for category \"tools\" not found" })
    );
}
