//! Event envelope exchanged over the queue.
//!
//! Upstream producers publish events as
//!
//! ```json
//! { "detail-type": "user.registered", "detail": { "email": "a@b.com" } }
//! ```
//!
//! Delivery infrastructure may add further top-level fields (`source`,
//! `id`, `time`, ...); they are ignored when decoding.

use serde_json::{Map, Value};

/// Wire name of the event type field.
const FIELD_DETAIL_TYPE: &str = "detail-type";

/// Wire name of the detail field.
const FIELD_DETAIL: &str = "detail";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Reasons a message body cannot be decoded into an [`EventEnvelope`].
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The body is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is valid JSON but not an object.
    #[error("Envelope must be a JSON object")]
    NotAnObject,

    /// A required top-level field is absent or null.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A top-level field has the wrong JSON type.
    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

// ---------------------------------------------------------------------------
// EventEnvelope
// ---------------------------------------------------------------------------

/// A decoded event: a type tag plus a free-form detail map.
///
/// Transient; scoped to a single processing attempt.
///
/// [`decode`](Self::decode) and [`to_wire`](Self::to_wire) map the
/// `detail-type` wire field onto `event_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    /// Dot-separated event type, e.g. `"product.activated"`.
    pub event_type: String,

    /// Event-specific key/value pairs.
    pub detail: Map<String, Value>,
}

impl EventEnvelope {
    /// Build an envelope from a type tag and detail map.
    pub fn new(event_type: impl Into<String>, detail: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            detail,
        }
    }

    /// Decode a raw message body.
    pub fn decode(body: &str) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_str(body)?;
        let Value::Object(mut root) = value else {
            return Err(EnvelopeError::NotAnObject);
        };

        let event_type = match root.remove(FIELD_DETAIL_TYPE) {
            None | Some(Value::Null) => return Err(EnvelopeError::MissingField(FIELD_DETAIL_TYPE)),
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(EnvelopeError::InvalidField {
                    field: FIELD_DETAIL_TYPE,
                    expected: "a string",
                })
            }
        };

        let detail = match root.remove(FIELD_DETAIL) {
            None | Some(Value::Null) => return Err(EnvelopeError::MissingField(FIELD_DETAIL)),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(EnvelopeError::InvalidField {
                    field: FIELD_DETAIL,
                    expected: "an object",
                })
            }
        };

        Ok(Self { event_type, detail })
    }

    /// Serialize to the wire shape consumed by [`decode`](Self::decode).
    pub fn to_wire(&self) -> String {
        let mut root = Map::new();
        root.insert(
            FIELD_DETAIL_TYPE.to_string(),
            Value::String(self.event_type.clone()),
        );
        root.insert(FIELD_DETAIL.to_string(), Value::Object(self.detail.clone()));
        Value::Object(root).to_string()
    }

    /// Look up a detail field as a non-empty string.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        detail_str(&self.detail, key)
    }
}

/// Look up `key` in a detail map as a non-empty string.
pub fn detail_str<'a>(detail: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    detail
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
