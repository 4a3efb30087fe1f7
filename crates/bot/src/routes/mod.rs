//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /alive                  - Liveness probe (empty body)
//! GET  /health                 - Health check
//!
//! # Slack
//! POST /slack/interactions     - Button and menu clicks (alias: /interaction)
//! POST /slack/events           - Events API push feed
//! ```

use axum::Router;
use axum::http::HeaderMap;

use crate::error::{AppError, Result};
use crate::state::AppState;

mod events;
mod health;
mod interactions;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(interactions::router())
        .merge(events::router())
}

/// Verify the Slack request signature when a signing secret is configured.
fn verify_signature(state: &AppState, headers: &HeaderMap, body: &str) -> Result<()> {
    let Some(verifier) = state.signature() else {
        return Ok(());
    };

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {name} header")))
    };
    let timestamp = header("X-Slack-Request-Timestamp")?;
    let signature = header("X-Slack-Signature")?;

    verifier
        .verify(timestamp, body, signature)
        .map_err(|e| AppError::Unauthorized(e.to_string()))
}
