//! The account operations the workflow depends on.

use async_trait::async_trait;
use esa_gatekeeper_core::{Email, ScreenName};

use super::error::EsaError;
use super::types::{MemberPage, MemberQuery};

/// The external account directory (an esa team).
///
/// [`EsaClient`](super::EsaClient) is the production implementation.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Name of the team, as in `https://{team}.esa.io`.
    fn team_name(&self) -> &str;

    /// Send an invitation email.
    async fn invite(&self, email: &Email) -> Result<(), EsaError>;

    /// Remove a member. A missing member is `EsaError::AlreadyDeleted`.
    async fn delete(&self, screen_name: &ScreenName) -> Result<(), EsaError>;

    /// List members.
    async fn list_members(&self, query: &MemberQuery) -> Result<MemberPage, EsaError>;

    /// Profile page of a member.
    fn profile_url(&self, screen_name: &ScreenName) -> String {
        format!("https://{}.esa.io/members/{screen_name}", self.team_name())
    }

    /// Team member search for a screen name.
    fn search_url(&self, screen_name: &ScreenName) -> String {
        format!(
            "https://{}.esa.io/team?keyword={screen_name}",
            self.team_name()
        )
    }
}
