//! Slack interaction callbacks.
//!
//! Slack posts `payload=<json>` as a form body for every button click and
//! menu selection. The response body replaces the original message.

use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use esa_gatekeeper_core::RequestId;
use tracing::{debug, instrument, warn};

use super::verify_signature;
use crate::error::{AppError, Result};
use crate::slack::{InteractionCallback, Message};
use crate::state::AppState;
use crate::workflow::{Action, Actor, Interaction};

/// Create interaction routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/slack/interactions", post(handle_interaction))
        .route("/interaction", post(handle_interaction))
}

/// Handle an interaction callback.
///
/// Token and channel mismatches are 401; undecodable payloads and unknown
/// actions are 500. Everything else answers 200 with the replacement
/// message, including refusals, which are rendered as hints.
#[instrument(skip(state, headers, body))]
async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Message>> {
    verify_signature(&state, &headers, &body)?;

    let payload = url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| AppError::MalformedPayload("Missing payload field".into()))?;

    let callback: InteractionCallback = serde_json::from_str(&payload)
        .map_err(|e| AppError::MalformedPayload(format!("Failed to parse payload: {e}")))?;

    if !state.verify_token(&callback.token) {
        return Err(AppError::Unauthorized("Invalid verification token".into()));
    }
    if callback.channel.id != state.channel_id() {
        warn!(channel_id = %callback.channel.id, "Interaction from another channel");
        return Err(AppError::Unauthorized("Invalid channel".into()));
    }

    let clicked = callback
        .actions
        .first()
        .ok_or_else(|| AppError::MalformedPayload("No actions in payload".into()))?;
    let action = Action::from_name(&clicked.name)
        .ok_or_else(|| AppError::UnknownAction(clicked.name.clone()))?;
    let selection = clicked
        .selected_options
        .first()
        .map(|option| option.value.clone());

    let interaction = Interaction {
        request_id: RequestId::new(callback.callback_id),
        action,
        actor: Actor {
            id: callback.user.id,
            name: callback.user.name,
        },
        selection,
        channel_id: callback.channel.id,
        message_ts: callback.message_ts,
        original: callback.original_message,
    };

    let transition = state.engine().handle(interaction).await;
    debug!(verdict = ?transition.verdict, "Interaction handled");

    // Executions stay detached; progress is reported through chat.update.
    drop(transition.execution);
    let mut message = transition.message;
    message.replace_original = true;
    Ok(Json(message))
}
