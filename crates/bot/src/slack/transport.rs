//! The chat operations the workflow depends on.

use async_trait::async_trait;

use super::error::SlackError;
use super::types::{Message, PostedMessage, UserProfile};

/// Outbound side of the chat transport.
///
/// [`SlackClient`](super::SlackClient) is the production implementation;
/// tests substitute an in-memory recorder.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post a new message to a channel.
    async fn post_message(
        &self,
        channel: &str,
        message: &Message,
    ) -> Result<PostedMessage, SlackError>;

    /// Replace an existing message in place.
    async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        message: &Message,
    ) -> Result<(), SlackError>;

    /// Resolve a user's profile.
    async fn user_info(&self, user_id: &str) -> Result<UserProfile, SlackError>;
}
