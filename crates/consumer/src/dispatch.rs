//! Message decoding and event-type routing.
//!
//! [`Dispatcher`] turns one [`RawMessage`] into at most one handler call.
//! Handlers are looked up in a registry keyed by the envelope's
//! `detail-type`, so new event types are added by registration rather than
//! by editing the dispatch path.
//!
//! Every outcome is terminal for the message: malformed bodies, unknown
//! types and handler failures are logged here and never propagated, so the
//! poller acknowledges the message either way.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use storefront_core::notify::NotifyError;
use storefront_core::EventEnvelope;

use crate::queue::RawMessage;

// ---------------------------------------------------------------------------
// Handler seam
// ---------------------------------------------------------------------------

/// A handler failed to perform its downstream side effect.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Handles the detail of one event type.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, detail: &Map<String, Value>) -> Result<(), HandlerError>;
}

// ---------------------------------------------------------------------------
// DispatchOutcome
// ---------------------------------------------------------------------------

/// What happened to a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The registered handler completed.
    Handled { event_type: String },
    /// The body could not be decoded as an envelope.
    Malformed,
    /// No handler is registered for this event type.
    UnknownType(String),
    /// The registered handler reported a downstream failure.
    Failed { event_type: String },
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Registry of event handlers keyed by event type.
#[derive(Default, Clone)]
pub struct Dispatcher {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl Dispatcher {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event_type`, replacing any earlier one.
    pub fn register(&mut self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event_type = event_type.into();
        if self.handlers.insert(event_type.clone(), handler).is_some() {
            tracing::warn!(event_type = %event_type, "Replaced existing event handler");
        }
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_handler(
        mut self,
        event_type: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        self.register(event_type, handler);
        self
    }

    /// Whether a handler is registered for `event_type`.
    pub fn handles(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Registered event types, sorted.
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Decode `message` and run the matching handler.
    pub async fn dispatch(&self, message: &RawMessage) -> DispatchOutcome {
        let message_id = message.id_for_log();
        tracing::info!(message_id, "Processing message");

        let envelope = match EventEnvelope::decode(&message.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    message_id,
                    error = %e,
                    body = %message.body,
                    "Failed to decode message body"
                );
                return DispatchOutcome::Malformed;
            }
        };

        let Some(handler) = self.handlers.get(&envelope.event_type) else {
            tracing::warn!(
                message_id,
                event_type = %envelope.event_type,
                "Unknown event type received"
            );
            return DispatchOutcome::UnknownType(envelope.event_type);
        };

        match handler.handle(&envelope.detail).await {
            Ok(()) => DispatchOutcome::Handled {
                event_type: envelope.event_type,
            },
            Err(e) => {
                tracing::error!(
                    message_id,
                    event_type = %envelope.event_type,
                    error = %e,
                    "Event handler failed"
                );
                DispatchOutcome::Failed {
                    event_type: envelope.event_type,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
