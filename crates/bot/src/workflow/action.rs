//! Interaction actions and who may perform them.

use esa_gatekeeper_core::RequestKind;

/// Who may perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Owner,
    Administrator,
    OwnerOrAdministrator,
}

/// A button or menu action carried by an interaction callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectOrganization,
    Confirm(RequestKind),
    Approve(RequestKind),
    Cancel,
    Reject,
}

impl Action {
    pub const INVITE_SELECT_ORGANIZATION: &'static str = "inviteSelectOrganization";
    pub const INVITE_CONFIRM: &'static str = "inviteConfirm";
    pub const INVITE_APPROVE: &'static str = "inviteApprove";
    pub const DELETE_CONFIRM: &'static str = "deleteConfirm";
    pub const DELETE_APPROVE: &'static str = "deleteApprove";
    pub const CLEANUP_CONFIRM: &'static str = "cleanupConfirm";
    pub const CLEANUP_APPROVE: &'static str = "cleanupApprove";
    pub const CANCEL: &'static str = "cancel";
    pub const REJECT: &'static str = "reject";

    /// Resolve an action from its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let action = match name {
            Self::INVITE_SELECT_ORGANIZATION => Self::SelectOrganization,
            Self::INVITE_CONFIRM => Self::Confirm(RequestKind::Invite),
            Self::INVITE_APPROVE => Self::Approve(RequestKind::Invite),
            Self::DELETE_CONFIRM => Self::Confirm(RequestKind::Delete),
            Self::DELETE_APPROVE => Self::Approve(RequestKind::Delete),
            Self::CLEANUP_CONFIRM => Self::Confirm(RequestKind::Cleanup),
            Self::CLEANUP_APPROVE => Self::Approve(RequestKind::Cleanup),
            Self::CANCEL => Self::Cancel,
            Self::REJECT => Self::Reject,
            _ => return None,
        };
        Some(action)
    }

    /// The wire name of the action.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SelectOrganization => Self::INVITE_SELECT_ORGANIZATION,
            Self::Confirm(RequestKind::Invite) => Self::INVITE_CONFIRM,
            Self::Confirm(RequestKind::Delete) => Self::DELETE_CONFIRM,
            Self::Confirm(RequestKind::Cleanup) => Self::CLEANUP_CONFIRM,
            Self::Approve(RequestKind::Invite) => Self::INVITE_APPROVE,
            Self::Approve(RequestKind::Delete) => Self::DELETE_APPROVE,
            Self::Approve(RequestKind::Cleanup) => Self::CLEANUP_APPROVE,
            Self::Cancel => Self::CANCEL,
            Self::Reject => Self::REJECT,
        }
    }

    #[must_use]
    pub const fn permission(self) -> Permission {
        match self {
            Self::SelectOrganization | Self::Confirm(_) | Self::Cancel => Permission::Owner,
            Self::Approve(_) => Permission::Administrator,
            Self::Reject => Permission::OwnerOrAdministrator,
        }
    }

    /// Verb used in permission hints.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::SelectOrganization => "select organization",
            Self::Confirm(_) => "confirm",
            Self::Approve(_) => "approve",
            Self::Cancel => "cancel",
            Self::Reject => "reject",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Action; 9] = [
        Action::SelectOrganization,
        Action::Confirm(RequestKind::Invite),
        Action::Confirm(RequestKind::Delete),
        Action::Confirm(RequestKind::Cleanup),
        Action::Approve(RequestKind::Invite),
        Action::Approve(RequestKind::Delete),
        Action::Approve(RequestKind::Cleanup),
        Action::Cancel,
        Action::Reject,
    ];

    #[test]
    fn test_names_resolve_back() {
        for action in ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(Action::from_name("inviteExecute"), None);
        assert_eq!(Action::from_name(""), None);
    }

    #[test]
    fn test_permissions() {
        assert_eq!(Action::Cancel.permission(), Permission::Owner);
        assert_eq!(
            Action::Approve(RequestKind::Delete).permission(),
            Permission::Administrator
        );
        assert_eq!(
            Action::Reject.permission(),
            Permission::OwnerOrAdministrator
        );
    }
}
