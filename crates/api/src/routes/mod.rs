pub mod events;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws       WebSocket upgrade for real-time product announcements
/// /events   publish an event upstream (EventBridge)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/events", post(events::publish_event))
}
