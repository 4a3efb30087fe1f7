//! esa API types.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use super::error::EsaError;

/// Largest page size esa accepts for member listings.
pub const MAX_PER_PAGE: u32 = 100;

/// Query for `GET /v1/teams/{team}/members`, least recently accessed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberQuery {
    pub per_page: u32,
}

impl MemberQuery {
    /// One full page, oldest access first.
    #[must_use]
    pub const fn least_recently_accessed() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
        }
    }

    /// Append the query options to `url`.
    ///
    /// # Errors
    ///
    /// Returns `EsaError::InvalidQuery` if `per_page` is outside `1..=100`.
    pub fn apply(&self, url: &mut Url) -> Result<(), EsaError> {
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(EsaError::InvalidQuery(format!(
                "invalid per page query: {}",
                self.per_page
            )));
        }
        url.query_pairs_mut()
            .append_pair("sort", "last_accessed")
            .append_pair("order", "asc")
            .append_pair("per_page", &self.per_page.to_string());
        Ok(())
    }
}

/// One page of team members.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberPage {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub prev_page: Option<u32>,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub max_per_page: u32,
}

/// A team member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub posts_count: u32,
    #[serde(default)]
    pub joined_at: String,
    #[serde(default)]
    pub last_accessed_at: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Member {
    /// Parse `last_accessed_at` (RFC 3339).
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error for malformed timestamps.
    pub fn last_accessed(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.last_accessed_at).map(|t| t.with_timezone(&Utc))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_least_recently_accessed_query() {
        let mut url = Url::parse("https://api.esa.io/v1/teams/docs/members").unwrap();
        MemberQuery::least_recently_accessed().apply(&mut url).unwrap();
        assert_eq!(
            url.query(),
            Some("sort=last_accessed&order=asc&per_page=100")
        );
    }

    #[test]
    fn test_out_of_range_page_size() {
        let mut url = Url::parse("https://api.esa.io/").unwrap();
        for per_page in [0, 101] {
            assert!(matches!(
                MemberQuery { per_page }.apply(&mut url),
                Err(EsaError::InvalidQuery(_))
            ));
        }
    }

    #[test]
    fn test_member_parses_last_access() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "name": "Alice",
            "screen_name": "alice",
            "last_accessed_at": "2024-02-01T09:00:00+09:00"
        }))
        .unwrap();
        assert_eq!(
            member.last_accessed().unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
    }
}
