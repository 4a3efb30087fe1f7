//! Expired member discovery for `cleanup`.

use chrono::{DateTime, Utc};
use esa_gatekeeper_core::ScreenName;
use tracing::{debug, warn};

use crate::esa::Member;

/// A member whose last access predates the cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredMember {
    pub screen_name: ScreenName,
    pub last_accessed: DateTime<Utc>,
}

/// Collect members last accessed before `cutoff`.
///
/// `members` must be sorted by last access, oldest first: the scan stops at
/// the first member accessed at or after the cutoff. Members with an
/// unparsable timestamp or screen name are skipped.
#[must_use]
pub fn select_expired(members: &[Member], cutoff: DateTime<Utc>) -> Vec<ExpiredMember> {
    let mut expired = Vec::new();
    for member in members {
        let last_accessed = match member.last_accessed() {
            Ok(at) => at,
            Err(e) => {
                warn!(
                    screen_name = %member.screen_name,
                    last_accessed_at = %member.last_accessed_at,
                    error = %e,
                    "Skipping member with unparsable last_accessed_at"
                );
                continue;
            }
        };
        if last_accessed >= cutoff {
            debug!(screen_name = %member.screen_name, "Reached first active member");
            break;
        }
        match ScreenName::parse(&member.screen_name) {
            Ok(screen_name) => expired.push(ExpiredMember {
                screen_name,
                last_accessed,
            }),
            Err(e) => {
                warn!(screen_name = %member.screen_name, error = %e, "Skipping member with invalid screen name");
            }
        }
    }
    expired
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn member(screen_name: &str, last_accessed_at: &str) -> Member {
        Member {
            screen_name: screen_name.to_string(),
            last_accessed_at: last_accessed_at.to_string(),
            ..Member::default()
        }
    }

    fn names(expired: &[ExpiredMember]) -> Vec<&str> {
        expired.iter().map(|m| m.screen_name.as_str()).collect()
    }

    #[test]
    fn test_stops_at_first_active_member() {
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let members = [
            member("old1", "2023-01-01T00:00:00+09:00"),
            member("old2", "2023-06-01T00:00:00+09:00"),
            member("fresh", "2024-02-01T00:00:00+09:00"),
            // Out of order on purpose: never reached.
            member("old3", "2022-01-01T00:00:00+09:00"),
        ];

        let expired = select_expired(&members, cutoff);
        assert_eq!(names(&expired), vec!["old1", "old2"]);
        assert_eq!(
            expired[0].last_accessed,
            Utc.with_ymd_and_hms(2022, 12, 31, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_member_at_cutoff_is_not_expired() {
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let members = [member("edge", "2024-01-01T00:00:00Z")];
        assert!(select_expired(&members, cutoff).is_empty());
    }

    #[test]
    fn test_skips_unparsable_dates() {
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let members = [
            member("broken", "yesterday"),
            member("old", "2023-01-01T00:00:00Z"),
        ];
        assert_eq!(names(&select_expired(&members, cutoff)), vec!["old"]);
    }
}
