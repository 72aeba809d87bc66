//! Upstream event publishing.
//!
//! `POST /api/v1/events` sends an event to EventBridge, from where it is
//! routed back into the consumer's queue. Used by the storefront services
//! that own registration and product activation, and for replaying events
//! by hand.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for [`publish_event`].
#[derive(Debug, Deserialize)]
pub struct PublishEventRequest {
    pub event_type: String,
    #[serde(default)]
    pub detail: Map<String, Value>,
}

/// Response body for [`publish_event`].
#[derive(Debug, Serialize)]
pub struct PublishedEvent {
    pub event_type: String,
    pub event_id: Option<String>,
}

/// POST /api/v1/events
pub async fn publish_event(
    State(state): State<AppState>,
    Json(body): Json<PublishEventRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PublishedEvent>>)> {
    let event_type = body.event_type.trim();
    if event_type.is_empty() {
        return Err(AppError::BadRequest("event_type must not be empty".into()));
    }

    let publisher = state
        .publisher
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("event publishing is not configured".into()))?;

    let event_id = publisher.publish_event(event_type, &body.detail).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: PublishedEvent {
                event_type: event_type.to_string(),
                event_id,
            },
        }),
    ))
}
