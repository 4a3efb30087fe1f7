//! Command errors.
//!
//! The `Display` text of every variant is posted back to the channel.

use esa_gatekeeper_core::{EmailError, ScreenNameError};
use thiserror::Error;

use crate::esa::EsaError;
use crate::slack::SlackError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid email address `{input}`: {source}")]
    InvalidEmail { input: String, source: EmailError },

    #[error("the domain of `{email}` is not allowed, use {allowed}")]
    DisallowedDomain { email: String, allowed: String },

    #[error("invalid screen name `{input}`: {source}")]
    InvalidScreenName {
        input: String,
        source: ScreenNameError,
    },

    #[error("target account is required")]
    MissingTarget,

    #[error("invalid month `{input}`, specify a number of months of at least {min}")]
    InvalidMonth { input: String, min: u32 },

    #[error("too many arguments")]
    TooManyArguments,

    #[error("failed to get the target list that matches the conditions: {0}")]
    Directory(#[source] EsaError),

    #[error(transparent)]
    Slack(#[from] SlackError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = CommandError::InvalidMonth {
            input: "3".to_string(),
            min: 6,
        };
        assert_eq!(
            err.to_string(),
            "invalid month `3`, specify a number of months of at least 6"
        );

        let err = CommandError::Directory(EsaError::Status(500));
        assert_eq!(
            err.to_string(),
            "failed to get the target list that matches the conditions: invalid status code: 500"
        );
    }
}
