//! Authentication state of a session.

use serde::{Deserialize, Serialize};

/// Whether a session currently holds a credential token.
///
/// `Anonymous --set_auth--> Authenticated --clear_auth--> Anonymous`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated,
}

impl AuthState {
    /// Whether this state grants access to checkout.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

impl std::str::FromStr for AuthState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anonymous" => Ok(Self::Anonymous),
            "authenticated" => Ok(Self::Authenticated),
            _ => Err(format!("invalid auth state: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_anonymous() {
        assert_eq!(AuthState::default(), AuthState::Anonymous);
        assert!(!AuthState::default().is_authenticated());
    }

    #[test]
    fn test_display_parse() {
        for state in [AuthState::Anonymous, AuthState::Authenticated] {
            assert_eq!(state.to_string().parse::<AuthState>().unwrap(), state);
        }
        assert!("admin".parse::<AuthState>().is_err());
    }
}
