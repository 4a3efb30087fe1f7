//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;

use crate::config::SlackConfig;
use crate::slack::{MessageEvent, SignatureVerifier, constant_time_compare};
use crate::workflow::WorkflowEngine;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    engine: Arc<WorkflowEngine>,
    events: mpsc::Sender<MessageEvent>,
    channel_id: String,
    verification_token: SecretString,
    signature: Option<SignatureVerifier>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `events` feeds the command listener.
    #[must_use]
    pub fn new(
        slack: &SlackConfig,
        engine: Arc<WorkflowEngine>,
        events: mpsc::Sender<MessageEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                engine,
                events,
                channel_id: slack.channel_id.clone(),
                verification_token: slack.verification_token.clone(),
                signature: slack.signing_secret.clone().map(SignatureVerifier::new),
            }),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &WorkflowEngine {
        &self.inner.engine
    }

    #[must_use]
    pub fn events(&self) -> &mpsc::Sender<MessageEvent> {
        &self.inner.events
    }

    /// The only channel interactions are accepted from.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.inner.channel_id
    }

    /// Signature verifier, when a signing secret is configured.
    #[must_use]
    pub fn signature(&self) -> Option<&SignatureVerifier> {
        self.inner.signature.as_ref()
    }

    /// Check a verification token in constant time.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> bool {
        constant_time_compare(self.inner.verification_token.expose_secret(), token)
    }
}
