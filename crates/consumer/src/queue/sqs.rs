//! Amazon SQS implementation of [`QueueClient`].

use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::Message;
use aws_sdk_sqs::Client;

use super::{QueueClient, QueueError, RawMessage, ReceiveRequest};

/// SQS queue bound to a single queue URL.
#[derive(Clone)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Build a client from the default AWS configuration chain.
    pub async fn from_env(queue_url: impl Into<String>) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&sdk_config), queue_url)
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl QueueClient for SqsQueue {
    async fn receive_batch(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, QueueError> {
        let wait_secs = i32::try_from(request.wait_time.as_secs()).unwrap_or(i32::MAX);

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(request.max_messages)
            .wait_time_seconds(wait_secs)
            .set_message_attribute_names(Some(request.attribute_names.clone()))
            .send()
            .await
            .map_err(|e| QueueError::Receive(DisplayErrorContext(&e).to_string()))?;

        Ok(output.messages().iter().filter_map(to_raw_message).collect())
    }

    async fn delete_message(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Delete(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

/// Convert an SQS message, skipping deliveries that cannot be acknowledged.
fn to_raw_message(message: &Message) -> Option<RawMessage> {
    let message_id = message.message_id().map(str::to_string);

    let Some(receipt_handle) = message.receipt_handle() else {
        tracing::warn!(
            message_id = message_id.as_deref().unwrap_or("-"),
            "SQS message without receipt handle, skipping"
        );
        return None;
    };

    Some(RawMessage {
        message_id,
        receipt_handle: receipt_handle.to_string(),
        body: message.body().unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_complete_message() {
        let message = Message::builder()
            .message_id("m-1")
            .receipt_handle("rh-1")
            .body(r#"{"detail-type":"x","detail":{}}"#)
            .build();

        let raw = to_raw_message(&message).unwrap();
        assert_eq!(raw.message_id.as_deref(), Some("m-1"));
        assert_eq!(raw.receipt_handle, "rh-1");
        assert_eq!(raw.body, r#"{"detail-type":"x","detail":{}}"#);
    }

    #[test]
    fn missing_body_becomes_empty_string() {
        let message = Message::builder().receipt_handle("rh-1").build();
        let raw = to_raw_message(&message).unwrap();
        assert_eq!(raw.body, "");
        assert!(raw.message_id.is_none());
    }

    #[test]
    fn skips_message_without_receipt_handle() {
        let message = Message::builder().message_id("m-1").body("{}").build();
        assert!(to_raw_message(&message).is_none());
    }
}
