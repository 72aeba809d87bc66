//! Shared building blocks for the storefront event consumer.
//!
//! - [`envelope`] -- the wire envelope published upstream and consumed from
//!   the queue.
//! - [`event_types`] -- well-known event type tags and broadcast names.
//! - [`notify`] -- collaborator seams (welcome email, real-time broadcast)
//!   that event handlers call into.

pub mod envelope;
pub mod event_types;
pub mod notify;

pub use envelope::{EnvelopeError, EventEnvelope};
pub use notify::{Broadcaster, NotifyError, WelcomeMailer};
