//! Domain event publishing to Amazon EventBridge.
//!
//! Events are sent as a single `PutEvents` entry whose `DetailType` is the
//! event type tag and whose `Detail` is the JSON-encoded detail map. An
//! EventBridge rule forwards them to the SQS queue the consumer polls, where
//! they arrive in the `{"detail-type": ..., "detail": {...}}` envelope shape.

use aws_sdk_eventbridge::error::DisplayErrorContext;
use aws_sdk_eventbridge::types::PutEventsRequestEntry;
use aws_sdk_eventbridge::Client;
use serde_json::{Map, Value};
use storefront_core::event_types::EVENT_SOURCE;

/// Bus used when `EVENT_BUS_NAME` is not set.
const DEFAULT_EVENT_BUS: &str = "default";

/// Error type for event publishing failures.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The request did not reach EventBridge or the service returned an error.
    #[error("EventBridge request failed: {0}")]
    Request(String),

    /// EventBridge accepted the request but rejected the entry.
    #[error("EventBridge rejected event: {code}: {message}")]
    Rejected { code: String, message: String },

    /// The detail map could not be serialized.
    #[error("Failed to encode event detail: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Publishes storefront events to an EventBridge bus.
#[derive(Clone)]
pub struct EventPublisher {
    client: Client,
    source: String,
    bus_name: String,
}

impl EventPublisher {
    /// Create a publisher over an existing client.
    pub fn new(client: Client, source: impl Into<String>, bus_name: impl Into<String>) -> Self {
        Self {
            client,
            source: source.into(),
            bus_name: bus_name.into(),
        }
    }

    /// Build a publisher from the default AWS configuration chain.
    ///
    /// | Variable         | Default   |
    /// |------------------|-----------|
    /// | `EVENT_BUS_NAME` | `default` |
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let bus_name =
            std::env::var("EVENT_BUS_NAME").unwrap_or_else(|_| DEFAULT_EVENT_BUS.to_string());
        Self::new(Client::new(&sdk_config), EVENT_SOURCE, bus_name)
    }

    /// Name of the target event bus.
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    /// Publish one event. Returns the EventBridge event id when assigned.
    pub async fn publish_event(
        &self,
        event_type: &str,
        detail: &Map<String, Value>,
    ) -> Result<Option<String>, PublishError> {
        let entry = build_entry(&self.source, &self.bus_name, event_type, detail)?;

        let output = self
            .client
            .put_events()
            .entries(entry)
            .send()
            .await
            .map_err(|e| PublishError::Request(DisplayErrorContext(&e).to_string()))?;

        let Some(result) = output.entries().first() else {
            return Ok(None);
        };

        if let Some(code) = result.error_code() {
            return Err(PublishError::Rejected {
                code: code.to_string(),
                message: result.error_message().unwrap_or_default().to_string(),
            });
        }

        let event_id = result.event_id().map(str::to_string);
        tracing::info!(
            event_type,
            event_id = event_id.as_deref().unwrap_or("-"),
            "Event sent to EventBridge"
        );
        Ok(event_id)
    }
}

/// Assemble the `PutEvents` entry for one event.
fn build_entry(
    source: &str,
    bus_name: &str,
    event_type: &str,
    detail: &Map<String, Value>,
) -> Result<PutEventsRequestEntry, PublishError> {
    Ok(PutEventsRequestEntry::builder()
        .source(source)
        .detail_type(event_type)
        .detail(serde_json::to_string(detail)?)
        .event_bus_name(bus_name)
        .build())
}
