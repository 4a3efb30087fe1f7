//! HTTP boundary errors with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server errors are captured to
//! Sentry before responding; details are never sent back to Slack.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application-level error type for the Slack endpoints.
#[derive(Debug, Error)]
pub enum AppError {
    /// Token, channel, or signature check failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request body could not be decoded.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The interaction names an action this bot does not know.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MalformedPayload(_) | Self::UnknownAction(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let message = match &self {
            Self::Unauthorized(_) => "Unauthorized",
            Self::BadRequest(_) => "Bad request",
            _ => "Internal server error",
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
