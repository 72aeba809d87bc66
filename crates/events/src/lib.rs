//! Storefront outbound delivery services.
//!
//! - [`delivery`] -- notification channels used by event handlers (SMTP
//!   welcome email).
//! - [`EventPublisher`] -- publishes domain events to EventBridge, which routes
//!   them to the queue the consumer reads from.

pub mod delivery;
pub mod publisher;

pub use delivery::email::{DisabledMailer, EmailConfig, EmailDelivery};
pub use publisher::{EventPublisher, PublishError};
