//! Handlers for the known storefront event types.
//!
//! Each handler performs exactly one downstream side effect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use storefront_core::event_types::{NEW_PRODUCT, PRODUCT_ACTIVATED, USER_REGISTERED};
use storefront_core::notify::{Broadcaster, WelcomeMailer};

use crate::dispatch::{Dispatcher, EventHandler, HandlerError};

/// Register the handlers for every known event type.
pub fn register_defaults(
    dispatcher: &mut Dispatcher,
    mailer: Arc<dyn WelcomeMailer>,
    broadcaster: Arc<dyn Broadcaster>,
) {
    dispatcher.register(USER_REGISTERED, Arc::new(UserRegisteredHandler::new(mailer)));
    dispatcher.register(
        PRODUCT_ACTIVATED,
        Arc::new(ProductActivatedHandler::new(broadcaster)),
    );
}

// ---------------------------------------------------------------------------
// user.registered
// ---------------------------------------------------------------------------

/// Sends the welcome email to the address in `detail.email`.
///
/// Delivery failures are logged and counted here; the event itself is
/// still considered handled.
pub struct UserRegisteredHandler {
    mailer: Arc<dyn WelcomeMailer>,
    failed_deliveries: AtomicU64,
}

impl UserRegisteredHandler {
    pub fn new(mailer: Arc<dyn WelcomeMailer>) -> Self {
        Self {
            mailer,
            failed_deliveries: AtomicU64::new(0),
        }
    }

    /// Welcome emails that could not be delivered since startup.
    pub fn failed_deliveries(&self) -> u64 {
        self.failed_deliveries.load(Ordering::Relaxed)
    }
}

/// What `detail.email` holds.
#[derive(Debug, PartialEq, Eq)]
enum Recipient<'a> {
    Address(&'a str),
    /// Absent, `null` or an empty string.
    Missing,
    /// Present but not a string; carries the JSON type name.
    NotAString(&'static str),
}

fn recipient(detail: &Map<String, Value>) -> Recipient<'_> {
    match detail.get("email") {
        None | Some(Value::Null) => Recipient::Missing,
        Some(Value::String(s)) if s.is_empty() => Recipient::Missing,
        Some(Value::String(s)) => Recipient::Address(s),
        Some(Value::Bool(_)) => Recipient::NotAString("boolean"),
        Some(Value::Number(_)) => Recipient::NotAString("number"),
        Some(Value::Array(_)) => Recipient::NotAString("array"),
        Some(Value::Object(_)) => Recipient::NotAString("object"),
    }
}

#[async_trait]
impl EventHandler for UserRegisteredHandler {
    async fn handle(&self, detail: &Map<String, Value>) -> Result<(), HandlerError> {
        let email = match recipient(detail) {
            Recipient::Address(email) => email,
            Recipient::Missing => {
                tracing::warn!("Event user.registered received but no email provided in detail");
                return Ok(());
            }
            Recipient::NotAString(kind) => {
                tracing::warn!(kind, "Event user.registered received with a non-string email");
                return Ok(());
            }
        };

        tracing::info!(email, "Event user.registered received, sending welcome email");

        if let Err(e) = self.mailer.send_welcome_email(email).await {
            self.failed_deliveries.fetch_add(1, Ordering::Relaxed);
            tracing::error!(email, reason = %e, "Failed to send welcome email");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// product.activated
// ---------------------------------------------------------------------------

/// Announces a newly activated product to connected clients.
pub struct ProductActivatedHandler {
    broadcaster: Arc<dyn Broadcaster>,
}

impl ProductActivatedHandler {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { broadcaster }
    }
}

/// `productId` and `merchantId` followed by every detail field.
///
/// The two ids are always present in the result (`null` when missing).
pub fn new_product_payload(detail: &Map<String, Value>) -> Value {
    let mut payload = Map::with_capacity(detail.len() + 2);
    for key in ["productId", "merchantId"] {
        payload.insert(
            key.to_string(),
            detail.get(key).cloned().unwrap_or(Value::Null),
        );
    }
    payload.extend(detail.iter().map(|(k, v)| (k.clone(), v.clone())));
    Value::Object(payload)
}

#[async_trait]
impl EventHandler for ProductActivatedHandler {
    async fn handle(&self, detail: &Map<String, Value>) -> Result<(), HandlerError> {
        let payload = new_product_payload(detail);
        tracing::info!(
            product_id = %payload["productId"],
            merchant_id = %payload["merchantId"],
            "Event product.activated received, broadcasting"
        );
        self.broadcaster.broadcast(NEW_PRODUCT, payload).await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
