//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, test_state};

#[tokio::test]
async fn health_reports_degraded_while_consumer_stopped() {
    let app = build_test_app(test_state());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["consumer_running"], false);
    assert_eq!(json["ws_connections"], 0);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn health_reports_ok_while_consumer_running() {
    let state = test_state();
    let poller = state.poller.clone();
    poller.start();

    let json = body_json(get(build_test_app(state), "/health").await).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["consumer_running"], true);

    poller.stop();
    assert!(poller.join(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = build_test_app(test_state());
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = build_test_app(test_state());
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin_and_json_only() {
    use axum::body::Body;
    use axum::http::{HeaderValue, Method, Request};
    use storefront_api::config::AllowedOrigins;
    use tower::ServiceExt;

    let mut config = common::test_config();
    config.allowed_origins =
        AllowedOrigins::List(vec![HeaderValue::from_static("https://shop.example.com")]);
    let app = build_test_app(common::state_with_config(config));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/v1/events")
                .header("origin", "https://shop.example.com")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "https://shop.example.com"
    );
    let allowed = headers
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed.contains("content-type"));
    assert!(!allowed.contains("authorization"));
}
