//! Liveness endpoints.

use axum::{Router, http::StatusCode, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alive", get(alive))
        .route("/health", get(health))
}

/// Returns 200 with an empty body.
async fn alive() -> StatusCode {
    StatusCode::OK
}

/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
