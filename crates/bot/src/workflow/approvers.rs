//! Administrators allowed to approve requests.

use tracing::{error, info};

use super::WorkflowError;
use crate::slack::format::{group_link, user_link};
use crate::slack::{ChatTransport, UserProfile};

/// Static allow-list of administrators, plus the optional user group that is
/// mentioned instead of each of them.
#[derive(Debug, Clone)]
pub struct Approvers {
    admins: Vec<UserProfile>,
    group_id: Option<String>,
}

impl Approvers {
    /// # Errors
    ///
    /// Returns `WorkflowError::NoAdministrators` if `admins` is empty.
    pub fn new(admins: Vec<UserProfile>, group_id: Option<String>) -> Result<Self, WorkflowError> {
        if admins.is_empty() {
            return Err(WorkflowError::NoAdministrators);
        }
        Ok(Self { admins, group_id })
    }

    /// Resolve administrator profiles. Unresolvable IDs are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NoAdministrators` if none could be resolved.
    pub async fn resolve(
        chat: &dyn ChatTransport,
        admin_ids: &[String],
        group_id: Option<String>,
    ) -> Result<Self, WorkflowError> {
        let mut admins = Vec::with_capacity(admin_ids.len());
        for id in admin_ids {
            match chat.user_info(id).await {
                Ok(profile) => admins.push(profile),
                Err(e) => error!(admin_id = %id, error = %e, "Failed to get admin user profile"),
            }
        }
        info!(count = admins.len(), "Administrators resolved");
        Self::new(admins, group_id)
    }

    #[must_use]
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|admin| admin.id == user_id)
    }

    /// Administrator user names, in configuration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.admins.iter().map(|admin| admin.name.as_str()).collect()
    }

    /// Mention that notifies the approvers.
    #[must_use]
    pub fn mention(&self) -> String {
        self.group_id.as_deref().map_or_else(
            || {
                self.admins
                    .iter()
                    .map(|admin| user_link(&admin.id))
                    .collect::<Vec<_>>()
                    .join(" ")
            },
            group_link,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn admin(id: &str, name: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            name: name.to_string(),
            email: String::new(),
        }
    }

    #[test]
    fn test_empty_admins_rejected() {
        assert!(matches!(
            Approvers::new(Vec::new(), None),
            Err(WorkflowError::NoAdministrators)
        ));
    }

    #[test]
    fn test_mentions_each_admin_without_group() {
        let approvers = Approvers::new(vec![admin("A1", "x"), admin("A2", "y")], None).unwrap();
        assert_eq!(approvers.mention(), "<@A1> <@A2>");
        assert!(approvers.is_admin("A2"));
        assert!(!approvers.is_admin("U9"));
        assert_eq!(approvers.names(), vec!["x", "y"]);
    }

    #[test]
    fn test_mentions_group_when_configured() {
        let approvers =
            Approvers::new(vec![admin("A1", "x")], Some("S123".to_string())).unwrap();
        assert_eq!(approvers.mention(), "<!subteam^S123>");
    }
}
