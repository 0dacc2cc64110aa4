//! User key type partitioning per-user state.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`UserKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UserKeyError {
    /// The input is empty or only whitespace.
    #[error("user key cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("user key must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Opaque identifier for a basket/favorites partition.
///
/// Usually a username or user ID. Unauthenticated visitors share the
/// [`UserKey::guest`] partition.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Must not be empty after trimming
/// - At most 256 characters
///
/// ## Examples
///
/// ```
/// use shopfront_core::UserKey;
///
/// assert_eq!(UserKey::parse("  alice ").unwrap().as_str(), "alice");
/// assert!(UserKey::parse("   ").is_err());
/// assert!(UserKey::guest().is_guest());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserKey(String);

impl UserKey {
    /// Maximum length of a user key.
    pub const MAX_LENGTH: usize = 256;

    /// Sentinel key for unauthenticated sessions.
    pub const GUEST: &'static str = "guest";

    /// Parse a `UserKey` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`UserKey::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, UserKeyError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(UserKeyError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(UserKeyError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The shared guest partition.
    #[must_use]
    pub fn guest() -> Self {
        Self(Self::GUEST.to_owned())
    }

    /// Whether this is the guest partition.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.0 == Self::GUEST
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for UserKey {
    type Err = UserKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserKey {
    type Error = UserKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserKey> for String {
    fn from(key: UserKey) -> Self {
        key.0
    }
}

impl AsRef<str> for UserKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_parse_trims() {
        assert_eq!(UserKey::parse(" bob\n").unwrap().as_str(), "bob");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(UserKey::parse(""), Err(UserKeyError::Empty));
        assert_eq!(UserKey::parse(" \t "), Err(UserKeyError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "k".repeat(UserKey::MAX_LENGTH + 1);
        assert!(matches!(
            UserKey::parse(&long),
            Err(UserKeyError::TooLong { .. })
        ));
        assert!(UserKey::parse(&"k".repeat(UserKey::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_guest() {
        assert_eq!(UserKey::guest().as_str(), "guest");
        assert!(UserKey::parse("guest").unwrap().is_guest());
        assert!(!UserKey::parse("alice").unwrap().is_guest());
    }

    #[test]
    fn test_usable_as_json_map_key() {
        let mut map = BTreeMap::new();
        map.insert(UserKey::parse("alice").unwrap(), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"alice":1}"#);

        let back: BTreeMap<UserKey, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<UserKey>("\"\"").is_err());
    }
}
