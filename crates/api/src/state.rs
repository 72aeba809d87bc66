use std::sync::Arc;

use storefront_consumer::Poller;
use storefront_events::EventPublisher;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Queue consumer hosted by this process.
    pub poller: Arc<Poller>,
    /// Upstream event publisher; `None` when `EVENT_BUS_NAME` is unset.
    pub publisher: Option<Arc<EventPublisher>>,
}
