//! esa API errors.

use esa_gatekeeper_core::ScreenName;
use thiserror::Error;

/// Errors that can occur when calling the esa API.
#[derive(Debug, Error)]
pub enum EsaError {
    /// HTTP request failed.
    #[error("esa request failed: {0}")]
    Request(String),

    /// esa answered with a non-success status.
    #[error("invalid status code: {0}")]
    Status(u16),

    /// Failed to parse response.
    #[error("esa response error: {0}")]
    Response(String),

    /// The member to delete does not exist.
    #[error("status code is 404, the specified account ({0}) has already been deleted")]
    AlreadyDeleted(ScreenName),

    /// A list query was built with out-of-range options.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
