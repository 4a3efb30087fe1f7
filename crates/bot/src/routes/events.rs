//! Slack Events API endpoint.
//!
//! Message events are queued for the command listener, which handles them
//! one at a time in arrival order.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, instrument, warn};

use super::verify_signature;
use crate::error::{AppError, Result};
use crate::slack::EventEnvelope;
use crate::state::AppState;

/// Create Events API routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/slack/events", post(handle_event))
}

/// Handle an Events API request.
#[instrument(skip(state, headers, body))]
async fn handle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Response> {
    verify_signature(&state, &headers, &body)?;

    if let Some(retry) = headers.get("X-Slack-Retry-Num") {
        debug!(retry = ?retry, "Ignoring Slack retry");
        return Ok(StatusCode::OK.into_response());
    }

    let envelope: EventEnvelope = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse event: {e}")))?;

    match envelope {
        EventEnvelope::UrlVerification { token, challenge } => {
            if !state.verify_token(&token) {
                return Err(AppError::Unauthorized("Invalid verification token".into()));
            }
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        EventEnvelope::EventCallback { token, event } => {
            if !state.verify_token(&token) {
                return Err(AppError::Unauthorized("Invalid verification token".into()));
            }
            if event.kind != "message" {
                debug!(kind = %event.kind, "Ignoring event");
                return Ok(StatusCode::OK.into_response());
            }
            match state.events().try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(event)) => {
                    warn!(ts = %event.ts, "Event queue full, dropping message");
                }
                Err(TrySendError::Closed(_)) => {
                    return Err(AppError::Internal("Command listener has stopped".into()));
                }
            }
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::Unsupported => Ok(StatusCode::OK.into_response()),
    }
}
