//! Well-known event type tags.
//!
//! These must match the `detail-type` values emitted by the upstream
//! publisher and the event name expected by real-time clients.

/// A new user account was created. Detail carries `email`.
pub const USER_REGISTERED: &str = "user.registered";

/// A merchant activated a product. Detail carries `productId` and
/// `merchantId` plus arbitrary product fields.
pub const PRODUCT_ACTIVATED: &str = "product.activated";

/// Event name pushed to connected WebSocket clients when a product goes live.
pub const NEW_PRODUCT: &str = "newProduct";

/// `Source` attached to every event this system publishes.
pub const EVENT_SOURCE: &str = "storefront";
