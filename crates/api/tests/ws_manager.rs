//! Unit tests for `WsManager`.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades. They verify add/remove semantics, event
//! broadcast framing, and graceful shutdown behaviour.

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::json;
use storefront_api::ws::WsManager;
use storefront_core::notify::Broadcaster;

fn text_json(msg: Message) -> serde_json::Value {
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string()).await;
    let _rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn broadcast_event_reaches_every_connection() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    let delivered = manager
        .broadcast_event("newProduct", json!({"productId": 7, "merchantId": 3}))
        .await;
    assert_eq!(delivered, 2);

    for rx in [&mut rx1, &mut rx2] {
        let frame = text_json(rx.recv().await.expect("should receive frame"));
        assert_eq!(frame["event"], "newProduct");
        assert_eq!(frame["data"], json!({"productId": 7, "merchantId": 3}));
    }
}

#[tokio::test]
async fn broadcast_skips_closed_receivers() {
    let manager = WsManager::new();
    let rx_closed = manager.add("gone".to_string()).await;
    let mut rx_open = manager.add("here".to_string()).await;
    drop(rx_closed);

    let delivered = manager.broadcast_event("newProduct", json!({})).await;

    assert_eq!(delivered, 1);
    assert!(rx_open.recv().await.is_some());
}

#[tokio::test]
async fn broadcaster_trait_sends_event_frame() {
    let manager = Arc::new(WsManager::new());
    let mut rx = manager.add("conn-1".to_string()).await;

    let broadcaster: Arc<dyn Broadcaster> = manager.clone();
    broadcaster
        .broadcast("newProduct", json!({"productId": 1}))
        .await;

    let frame = text_json(rx.recv().await.unwrap());
    assert_eq!(frame["event"], "newProduct");
    assert_eq!(frame["data"]["productId"], 1);
}

#[tokio::test]
async fn broadcast_with_no_connections_is_noop() {
    let manager = WsManager::new();
    assert_eq!(manager.broadcast_event("newProduct", json!({})).await, 0);
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx.recv().await, Some(Message::Close(None))));
}

#[tokio::test]
async fn ping_all_sends_ping_frames() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    assert!(matches!(rx.recv().await, Some(Message::Ping(_))));
}
