//! Downstream collaborator seams.
//!
//! Event handlers depend on these traits rather than on concrete delivery
//! services, so the SMTP mailer and the WebSocket manager live in their own
//! crates and tests can substitute in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;

/// A downstream notification collaborator failed.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Delivery is not configured in this process.
    #[error("{0} delivery not configured")]
    NotConfigured(&'static str),

    /// The collaborator attempted delivery and failed.
    #[error("{0}")]
    Delivery(String),
}

/// Sends the fixed-template welcome email to a newly registered user.
#[async_trait]
pub trait WelcomeMailer: Send + Sync {
    async fn send_welcome_email(&self, address: &str) -> Result<(), NotifyError>;
}

/// Pushes a named event to every connected real-time subscriber.
///
/// Fire-and-forget: per-subscriber delivery is the implementor's concern.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, event_name: &str, payload: Value);
}
