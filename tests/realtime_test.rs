//! Mutation-to-subscriber integration tests
//!
//! Subscribers are attached straight to the hub with a test transport; the
//! mutations go through the router like any HTTP client's would.

mod common;

use axum::http::{Method, StatusCode};
use common::{next_json, send, ChannelTransport, TestApp};
use serde_json::json;
use storefront::shared::AppConfig;

#[tokio::test]
async fn test_subscriber_receives_welcome_then_change_events() {
    let app = TestApp::new();
    let (transport, mut rx) = ChannelTransport::new();
    let connection = app.app.state.hub.subscribe("products", transport).await.unwrap();

    let welcome = next_json(&mut rx).await.expect("welcome");
    assert_eq!(welcome["type"], "WELCOME");
    assert_eq!(welcome["channel"], "products");
    assert_eq!(welcome["connectionId"], connection.id().to_string());

    let (status, product) = send(
        app.router(),
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Desk Lamp", "price_cents": 2500 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let event = next_json(&mut rx).await.expect("create event");
    assert_eq!(event["entity"], "product");
    assert_eq!(event["type"], "CREATE");
    assert_eq!(event["data"]["id"], product["id"]);
    assert!(event["createdAt"].is_string());

    send(
        app.router(),
        Method::DELETE,
        &format!("/api/products/{}", product["id"].as_str().unwrap()),
        None,
    )
    .await;
    let event = next_json(&mut rx).await.expect("delete event");
    assert_eq!(event["type"], "DELETE");
    assert_eq!(event["data"]["name"], "Desk Lamp");
}

#[tokio::test]
async fn test_channels_are_isolated() {
    let app = TestApp::new();
    let (transport, mut rx) = ChannelTransport::new();
    app.app.state.hub.subscribe("categories", transport).await.unwrap();
    next_json(&mut rx).await.expect("welcome");

    send(
        app.router(),
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Mug", "price_cents": 799 })),
    )
    .await;
    app.settle().await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_failing_subscriber_does_not_affect_mutation_or_siblings() {
    let app = TestApp::new();
    let (healthy, mut healthy_rx) = ChannelTransport::new();
    let (broken, mut broken_rx) = ChannelTransport::new();
    app.app.state.hub.subscribe("users", healthy).await.unwrap();
    app.app.state.hub.subscribe("users", broken.clone()).await.unwrap();
    next_json(&mut healthy_rx).await.expect("welcome");
    next_json(&mut broken_rx).await.expect("welcome");
    broken.break_now();

    let (status, _) = send(
        app.router(),
        Method::POST,
        "/api/users",
        Some(json!({ "name": "Ada", "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let event = next_json(&mut healthy_rx).await.expect("sibling still served");
    assert_eq!(event["entity"], "user");
    assert_eq!(event["data"]["name"], "Ada");
    assert!(event["data"].get("email").is_none());

    app.settle().await;
    assert_eq!(app.app.state.hub.connection_count("users").unwrap(), 1);
}

#[tokio::test]
async fn test_unconfigured_channel_does_not_fail_mutation() {
    let config = AppConfig::builder()
        .channels(["products", "users"])
        .build()
        .unwrap();
    let app = TestApp::with_config(config);

    let (_, product) = send(
        app.router(),
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Mug", "price_cents": 799 })),
    )
    .await;
    let (status, order) = send(
        app.router(),
        Method::POST,
        "/api/orders",
        Some(json!({ "product_id": product["id"], "quantity": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["quantity"], 1);
    assert!(app.app.state.hub.subscribe("orders", ChannelTransport::new().0).await.is_err());
}

#[tokio::test]
async fn test_order_status_change_is_broadcast_as_update() {
    let app = TestApp::new();
    let (transport, mut rx) = ChannelTransport::new();
    app.app.state.hub.subscribe("orders", transport).await.unwrap();
    next_json(&mut rx).await.expect("welcome");

    let (_, product) = send(
        app.router(),
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Mug", "price_cents": 799 })),
    )
    .await;
    let (_, order) = send(
        app.router(),
        Method::POST,
        "/api/orders",
        Some(json!({ "product_id": product["id"], "quantity": 1 })),
    )
    .await;
    assert_eq!(next_json(&mut rx).await.expect("create")["type"], "CREATE");

    send(
        app.router(),
        Method::PUT,
        &format!("/api/orders/{}/status", order["id"].as_str().unwrap()),
        Some(json!({ "status": "paid" })),
    )
    .await;
    let event = next_json(&mut rx).await.expect("update");
    assert_eq!(event["type"], "UPDATE");
    assert_eq!(event["data"]["status"], "paid");
}
