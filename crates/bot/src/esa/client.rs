//! esa API v1 client.

use async_trait::async_trait;
use esa_gatekeeper_core::{Email, ScreenName};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

use super::directory::AccountDirectory;
use super::error::EsaError;
use super::types::{MemberPage, MemberQuery};

/// esa API base URL.
const ESA_API_BASE: &str = "https://api.esa.io/v1/teams";

/// Client for one esa team.
#[derive(Clone)]
pub struct EsaClient {
    client: Client,
    team_name: String,
    token: SecretString,
}

impl std::fmt::Debug for EsaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsaClient")
            .field("team_name", &self.team_name)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl EsaClient {
    #[must_use]
    pub fn new(team_name: String, token: SecretString) -> Self {
        Self {
            client: Client::new(),
            team_name,
            token,
        }
    }

    /// Team endpoint with each of `segments` appended as one escaped path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, EsaError> {
        let mut url = Url::parse(ESA_API_BASE).map_err(|e| EsaError::Request(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| EsaError::Request(format!("cannot append a path to {ESA_API_BASE}")))?
            .push(&self.team_name)
            .extend(segments);
        Ok(url)
    }
}

fn check_status(status: StatusCode) -> Result<(), EsaError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(EsaError::Status(status.as_u16()))
    }
}

#[async_trait]
impl AccountDirectory for EsaClient {
    fn team_name(&self) -> &str {
        &self.team_name
    }

    #[instrument(skip(self), fields(team = %self.team_name))]
    async fn invite(&self, email: &Email) -> Result<(), EsaError> {
        let body = serde_json::json!({ "member": { "emails": [email.as_str()] } });

        let response = self
            .client
            .post(self.endpoint(&["invitations"])?)
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EsaError::Request(e.to_string()))?;

        check_status(response.status())?;
        debug!("Invitation sent");
        Ok(())
    }

    #[instrument(skip(self), fields(team = %self.team_name))]
    async fn delete(&self, screen_name: &ScreenName) -> Result<(), EsaError> {
        let response = self
            .client
            .delete(self.endpoint(&["members", screen_name.as_str()])?)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| EsaError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(EsaError::AlreadyDeleted(screen_name.clone()));
        }
        check_status(response.status())?;
        debug!("Member deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(team = %self.team_name))]
    async fn list_members(&self, query: &MemberQuery) -> Result<MemberPage, EsaError> {
        let mut url = self.endpoint(&["members"])?;
        query.apply(&mut url)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| EsaError::Request(e.to_string()))?;

        check_status(response.status())?;

        let page: MemberPage = response
            .json()
            .await
            .map_err(|e| EsaError::Response(e.to_string()))?;

        debug!(count = page.members.len(), "Members listed");
        Ok(page)
    }
}
