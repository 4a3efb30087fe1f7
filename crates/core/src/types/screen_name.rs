//! esa member screen name.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ScreenName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreenNameError {
    /// The input string is empty.
    #[error("screen name cannot be empty")]
    Empty,
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("screen name contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// The handle of an esa team member, as used in `/members/{screen_name}`.
///
/// Only ASCII letters, digits, `_` and `-` are accepted. Screen names end up
/// in API paths, so dot segments and percent escapes must never get through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ScreenName(String);

impl ScreenName {
    /// Parse a `ScreenName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains a character outside
    /// the handle charset.
    pub fn parse(s: &str) -> Result<Self, ScreenNameError> {
        if s.is_empty() {
            return Err(ScreenNameError::Empty);
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-')))
        {
            return Err(ScreenNameError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the screen name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ScreenName {
    type Err = ScreenNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ScreenName {
    type Error = ScreenNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ScreenName> for String {
    fn from(value: ScreenName) -> Self {
        value.0
    }
}

impl AsRef<str> for ScreenName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(ScreenName::parse("alice").unwrap().as_str(), "alice");
        assert!(ScreenName::parse("alice_01-x").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ScreenName::parse(""), Err(ScreenNameError::Empty));
    }

    #[test]
    fn test_parse_forbidden_characters() {
        for (input, c) in [
            ("a b", ' '),
            ("a/b", '/'),
            ("a,b", ','),
            ("a?b", '?'),
            ("élise", 'é'),
        ] {
            assert_eq!(
                ScreenName::parse(input),
                Err(ScreenNameError::InvalidCharacter(c))
            );
        }
    }

    #[test]
    fn test_parse_rejects_dot_segments_and_escapes() {
        assert_eq!(
            ScreenName::parse(".."),
            Err(ScreenNameError::InvalidCharacter('.'))
        );
        assert_eq!(
            ScreenName::parse("."),
            Err(ScreenNameError::InvalidCharacter('.'))
        );
        assert_eq!(
            ScreenName::parse("%2e%2e"),
            Err(ScreenNameError::InvalidCharacter('%'))
        );
        assert_eq!(
            ScreenName::parse("alice.smith"),
            Err(ScreenNameError::InvalidCharacter('.'))
        );
    }
}
