//! Slack request signature verification.
//!
//! Implements <https://api.slack.com/authentication/verifying-requests-from-slack>.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{debug, instrument};

use super::error::SlackError;

/// Maximum age of a signed request, in seconds.
const MAX_REQUEST_AGE_SECS: u64 = 300;

/// Verifies `X-Slack-Signature` headers with the app's signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    signing_secret: SecretString,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("signing_secret", &"[REDACTED]")
            .finish()
    }
}

impl SignatureVerifier {
    #[must_use]
    pub const fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret }
    }

    /// Verify a Slack webhook signature.
    ///
    /// # Arguments
    ///
    /// * `timestamp` - The `X-Slack-Request-Timestamp` header value
    /// * `body` - The raw request body
    /// * `signature` - The `X-Slack-Signature` header value
    ///
    /// # Errors
    ///
    /// Returns error if the timestamp is stale or the signature does not match.
    #[instrument(skip(self, body, signature))]
    pub fn verify(&self, timestamp: &str, body: &str, signature: &str) -> Result<(), SlackError> {
        let ts: i64 = timestamp
            .parse()
            .map_err(|_| SlackError::InvalidSignature("Invalid timestamp".to_string()))?;

        let now = chrono::Utc::now().timestamp();

        let within_window = now
            .checked_sub(ts)
            .is_some_and(|age| age.unsigned_abs() <= MAX_REQUEST_AGE_SECS);
        if !within_window {
            return Err(SlackError::InvalidSignature(
                "Request timestamp too old".to_string(),
            ));
        }

        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.signing_secret.expose_secret().as_bytes())
                .map_err(|e| SlackError::InvalidSignature(e.to_string()))?;

        mac.update(format!("v0:{timestamp}:{body}").as_bytes());

        let expected = format!("v0={}", hex::encode(mac.finalize().into_bytes()));

        if !constant_time_compare(&expected, signature) {
            return Err(SlackError::InvalidSignature(
                "Signature mismatch".to_string(),
            ));
        }

        debug!("Slack signature verified");

        Ok(())
    }
}

/// Constant-time string comparison to prevent timing attacks.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
