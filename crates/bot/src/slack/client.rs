//! Slack Web API client.
//!
//! Provides methods for posting messages, updating messages, and resolving
//! user profiles.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, error, instrument};

use super::error::SlackError;
use super::transport::ChatTransport;
use super::types::{Message, MessageResponse, PostedMessage, UserInfoResponse, UserProfile};

/// Slack Web API base URL.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Slack API client for the bot user.
#[derive(Clone)]
pub struct SlackClient {
    /// HTTP client.
    client: Client,
    /// Bot token for authentication.
    bot_token: SecretString,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("bot_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    #[serde(flatten)]
    message: &'a Message,
}

#[derive(Serialize)]
struct UpdateMessage<'a> {
    channel: &'a str,
    ts: &'a str,
    #[serde(flatten)]
    message: &'a Message,
}

impl SlackClient {
    /// Create a new Slack client.
    #[must_use]
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            client: Client::new(),
            bot_token,
        }
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<MessageResponse, SlackError> {
        let response = self
            .client
            .post(format!("{SLACK_API_BASE}/{method}"))
            .bearer_auth(self.bot_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let result: MessageResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        if !result.ok {
            error!(error = ?result.error, method, "Slack API error");
            return Err(SlackError::Api(
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        Ok(result)
    }
}

#[async_trait]
impl ChatTransport for SlackClient {
    #[instrument(skip(self, message))]
    async fn post_message(
        &self,
        channel: &str,
        message: &Message,
    ) -> Result<PostedMessage, SlackError> {
        let result = self
            .call("chat.postMessage", &PostMessage { channel, message })
            .await?;

        debug!(ts = ?result.ts, "Message posted to Slack");

        Ok(PostedMessage {
            channel: result.channel.unwrap_or_else(|| channel.to_string()),
            ts: result.ts.unwrap_or_default(),
        })
    }

    #[instrument(skip(self, message))]
    async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        message: &Message,
    ) -> Result<(), SlackError> {
        self.call("chat.update", &UpdateMessage { channel, ts, message })
            .await?;

        debug!("Message updated in Slack");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn user_info(&self, user_id: &str) -> Result<UserProfile, SlackError> {
        let url = url::Url::parse_with_params(
            &format!("{SLACK_API_BASE}/users.info"),
            &[("user", user_id)],
        )
        .map_err(|e| SlackError::Request(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(self.bot_token.expose_secret())
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let result: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        match (result.ok, result.user) {
            (true, Some(user)) => Ok(user.into()),
            _ => {
                error!(error = ?result.error, "Slack API error resolving user");
                Err(SlackError::Api(
                    result.error.unwrap_or_else(|| "user_not_found".to_string()),
                ))
            }
        }
    }
}
