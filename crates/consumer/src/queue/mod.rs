//! Durable queue abstraction.
//!
//! [`QueueClient`] captures the two operations the poller needs: a batched
//! long-poll receive and delete-by-receipt-handle. [`sqs::SqsQueue`] is the
//! production implementation.

pub mod sqs;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::PollerConfig;

pub use sqs::SqsQueue;

/// One delivery of a queued message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Queue-assigned message id, used for logging.
    pub message_id: Option<String>,
    /// Handle identifying this delivery; required to delete it.
    pub receipt_handle: String,
    /// Serialized event envelope.
    pub body: String,
}

impl RawMessage {
    /// Message id for log fields, `-` when the queue did not provide one.
    pub fn id_for_log(&self) -> &str {
        self.message_id.as_deref().unwrap_or("-")
    }
}

/// Parameters of one batched receive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveRequest {
    pub max_messages: i32,
    pub wait_time: Duration,
    pub attribute_names: Vec<String>,
}

impl ReceiveRequest {
    /// The standard request: 10 messages, 20 second long-poll, all attributes.
    pub fn long_poll() -> Self {
        Self::from(&PollerConfig::default())
    }
}

impl From<&PollerConfig> for ReceiveRequest {
    fn from(config: &PollerConfig) -> Self {
        Self {
            max_messages: config.max_messages,
            wait_time: config.wait_time,
            attribute_names: config.attribute_names.clone(),
        }
    }
}

/// Queue operation failures. Always treated as transient.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Delete failed: {0}")]
    Delete(String),
}

/// Receive/delete access to a durable message queue.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Receive up to `request.max_messages`, waiting up to
    /// `request.wait_time` for at least one to arrive.
    async fn receive_batch(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, QueueError>;

    /// Acknowledge a delivery so the queue does not redeliver it.
    async fn delete_message(&self, receipt_handle: &str) -> Result<(), QueueError>;
}
