#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use storefront_api::config::{default_shutdown_grace, AllowedOrigins, ServerConfig};
use storefront_api::router::build_app_router;
use storefront_api::state::AppState;
use storefront_api::ws::WsManager;
use storefront_consumer::{
    ConsumerConfig, Dispatcher, Poller, PollerConfig, QueueClient, QueueError, RawMessage,
    ReceiveRequest,
};
use tower::ServiceExt;

/// Queue that never has messages.
pub struct EmptyQueue;

#[async_trait]
impl QueueClient for EmptyQueue {
    async fn receive_batch(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, QueueError> {
        tokio::time::sleep(request.wait_time).await;
        Ok(Vec::new())
    }

    async fn delete_message(&self, _receipt_handle: &str) -> Result<(), QueueError> {
        Ok(())
    }
}

/// Build a test `ServerConfig`: loopback, any origin, 50 ms long poll.
pub fn test_config() -> ServerConfig {
    let poller = PollerConfig {
        wait_time: Duration::from_millis(50),
        ..PollerConfig::default()
    };
    ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        allowed_origins: AllowedOrigins::Any,
        shutdown_grace: default_shutdown_grace(&poller),
        consumer: ConsumerConfig {
            queue_url: "http://localhost:4566/000000000000/storefront".to_string(),
            poller,
        },
    }
}

/// Application state with an idle poller and no publisher.
pub fn test_state() -> AppState {
    state_with_config(test_config())
}

/// Application state over `config` with an idle poller and no publisher.
pub fn state_with_config(config: ServerConfig) -> AppState {
    let poller = Poller::new(
        Arc::new(EmptyQueue),
        Dispatcher::new(),
        config.consumer.poller.clone(),
    );
    AppState {
        config: Arc::new(config),
        ws_manager: Arc::new(WsManager::new()),
        poller: Arc::new(poller),
        publisher: None,
    }
}

/// Build the full application router over `state`.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
