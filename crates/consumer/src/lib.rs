//! Storefront queue consumer.
//!
//! Pulls event envelopes from SQS, routes each one to the handler registered
//! for its `detail-type`, and acknowledges it. The three cooperating parts:
//!
//! - [`Poller`] -- owns the receive loop, pacing, error backoff and the
//!   running flag toggled by [`Poller::start`] / [`Poller::stop`].
//! - [`Dispatcher`] -- decodes each message and looks up its handler in a
//!   registry keyed by event type.
//! - [`handlers`] -- one thin adapter per known event type, each calling a
//!   single downstream collaborator.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod poller;
pub mod queue;

pub use config::{ConsumerConfig, PollerConfig};
pub use dispatch::{DispatchOutcome, Dispatcher, EventHandler, HandlerError};
pub use poller::{IterationReport, Poller};
pub use queue::{QueueClient, QueueError, RawMessage, ReceiveRequest};
