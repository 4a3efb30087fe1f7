//! Pending request identity.

use core::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a pending request.
///
/// The identifier is the request's creation time rendered as RFC 3339 with
/// nanosecond precision, so it doubles as the timestamp used for expiry.
/// Identifiers arriving from Slack callbacks are arbitrary strings; use
/// [`RequestId::issued_at`] to recover the creation time, which is `None`
/// when the string was not produced by [`RequestId::from_timestamp`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Build the identifier for a request created at `at`.
    #[must_use]
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    /// Wrap an identifier received from the outside world.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The creation time encoded in the identifier.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The workflow a pending request belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Send an esa invitation to an email address.
    Invite,
    /// Delete one esa member.
    Delete,
    /// Delete every member that has not accessed esa for a number of months.
    Cleanup,
}

impl RequestKind {
    /// Returns the kind as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invite => "invite",
            Self::Delete => "delete",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
