//! Storefront API host library.
//!
//! Hosts the queue consumer alongside the HTTP/WebSocket server that
//! real-time clients connect to. Exposes config, state, routing and the
//! WebSocket infrastructure so integration tests and the binary entrypoint
//! can both access them.

pub mod config;
pub mod error;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
