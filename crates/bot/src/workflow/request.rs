//! Pending request data and lifecycle state.

use esa_gatekeeper_core::{Email, RequestId, RequestKind, ScreenName};

use crate::slack::UserProfile;

/// What a request will do once approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Invite one email address.
    Invite(Email),
    /// Delete one member.
    Delete(ScreenName),
    /// Delete a batch of expired members, in order.
    Cleanup(Vec<ScreenName>),
}

impl Target {
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::Invite(_) => RequestKind::Invite,
            Self::Delete(_) => RequestKind::Delete,
            Self::Cleanup(_) => RequestKind::Cleanup,
        }
    }

    /// The payload as shown to users: an address, a screen name, or a
    /// comma-joined batch of screen names.
    #[must_use]
    pub fn value(&self) -> String {
        match self {
            Self::Invite(email) => email.to_string(),
            Self::Delete(screen_name) => screen_name.to_string(),
            Self::Cleanup(batch) => batch
                .iter()
                .map(ScreenName::as_str)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// How a request ended without being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Cancelled,
    Rejected,
}

/// Position of a request in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Delete or cleanup proposal waiting for the owner to confirm.
    Proposed,
    /// Invite waiting for the owner to pick an organization.
    AwaitingOrganization,
    /// Invite with an organization, waiting for the owner to confirm.
    AwaitingConfirmation,
    /// Confirmed, waiting for an administrator.
    AwaitingApproval,
    /// Approved; the external operation has been handed to a background task.
    Executing,
    /// Closed without execution.
    Terminated { outcome: Outcome },
}

impl RequestState {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Executing | Self::Terminated { .. })
    }

    /// Human-readable description used in hints.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Proposed | Self::AwaitingConfirmation => "waiting for confirmation",
            Self::AwaitingOrganization => "waiting for an organization",
            Self::AwaitingApproval => "waiting for approval",
            Self::Executing => "already approved",
            Self::Terminated {
                outcome: Outcome::Cancelled,
            } => "already canceled",
            Self::Terminated {
                outcome: Outcome::Rejected,
            } => "already rejected",
        }
    }
}

/// One invite, delete, or cleanup workflow instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub target: Target,
    /// Set once, by the invite flow's organization step.
    pub organization: Option<String>,
    pub owner: UserProfile,
    pub state: RequestState,
}

impl PendingRequest {
    /// Create a request in its kind's initial state.
    #[must_use]
    pub fn new(id: RequestId, target: Target, owner: UserProfile) -> Self {
        let state = match target {
            Target::Invite(_) => RequestState::AwaitingOrganization,
            Target::Delete(_) | Target::Cleanup(_) => RequestState::Proposed,
        };
        Self {
            id,
            target,
            organization: None,
            owner,
            state,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        self.target.kind()
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner.id == user_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn owner() -> UserProfile {
        UserProfile {
            id: "U1".to_string(),
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn test_initial_states() {
        let invite = PendingRequest::new(
            RequestId::new("a"),
            Target::Invite(Email::parse("a@example.com").unwrap()),
            owner(),
        );
        assert_eq!(invite.state, RequestState::AwaitingOrganization);

        let delete = PendingRequest::new(
            RequestId::new("b"),
            Target::Delete(ScreenName::parse("bob").unwrap()),
            owner(),
        );
        assert_eq!(delete.state, RequestState::Proposed);
        assert!(delete.is_owned_by("U1"));
        assert!(!delete.is_owned_by("U2"));
    }

    #[test]
    fn test_cleanup_value_is_comma_joined() {
        let target = Target::Cleanup(vec![
            ScreenName::parse("a").unwrap(),
            ScreenName::parse("b").unwrap(),
        ]);
        assert_eq!(target.value(), "a,b");
        assert_eq!(target.kind(), RequestKind::Cleanup);
    }

    #[test]
    fn test_closed_states() {
        assert!(RequestState::Executing.is_closed());
        assert!(
            RequestState::Terminated {
                outcome: Outcome::Rejected
            }
            .is_closed()
        );
        assert!(!RequestState::AwaitingApproval.is_closed());
    }
}
