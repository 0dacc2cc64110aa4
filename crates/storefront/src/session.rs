//! Authentication session.
//!
//! Holds the credential token and identity of the logged-in user and gates
//! checkout. The session is persisted to the `auth-storage` record:
//!
//! ```text
//! Anonymous --set_auth--> Authenticated --clear_auth--> Anonymous
//! ```
//!
//! Until [`AuthSession::restore`] runs, [`AuthSession::is_authenticated`]
//! answers from durable storage so callers see a login made by an earlier
//! process.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopfront_core::{AuthState, UserKey};

use crate::identity::IdentityResolver;
use crate::storage::{Storage, keys, load_record, read_record, save_record};

/// Persisted session layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SessionRecord {
    #[serde(default)]
    pub(crate) token: Option<String>,
    #[serde(default)]
    pub(crate) username: Option<String>,
    #[serde(default)]
    pub(crate) user_id: Option<String>,
}

/// The current credential token and user identity.
pub struct AuthSession {
    storage: Arc<dyn Storage>,
    identity: IdentityResolver,
    token: Option<SecretString>,
    username: Option<String>,
    user_id: Option<String>,
    hydrated: bool,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("user_id", &self.user_id)
            .field("hydrated", &self.hydrated)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// An empty, not yet restored session.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let identity = IdentityResolver::new(Arc::clone(&storage));
        Self::with_identity(storage, identity)
    }

    /// An empty session that publishes its user to `identity` and every
    /// clone of it.
    #[must_use]
    pub const fn with_identity(storage: Arc<dyn Storage>, identity: IdentityResolver) -> Self {
        Self {
            storage,
            identity,
            token: None,
            username: None,
            user_id: None,
            hydrated: false,
        }
    }

    /// A session restored from storage.
    #[must_use]
    pub fn restored(storage: Arc<dyn Storage>) -> Self {
        let mut session = Self::new(storage);
        session.restore();
        session
    }

    /// Replace the in-memory state with the persisted record.
    pub fn restore(&mut self) {
        let record: SessionRecord = load_record(self.storage.as_ref(), keys::SESSION);
        self.token = record.token.map(SecretString::from);
        self.username = record.username;
        self.user_id = record.user_id;
        self.hydrated = true;
        self.identity.set_session_user(self.user_key());

        tracing::debug!(authenticated = self.token.is_some(), "Session restored");
    }

    /// Record a successful login.
    ///
    /// `user_id` falls back to `username` when absent or blank.
    pub fn set_auth(&mut self, token: SecretString, username: &str, user_id: Option<&str>) {
        let user_id = user_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(username)
            .to_owned();

        save_record(
            self.storage.as_ref(),
            keys::SESSION,
            &SessionRecord {
                token: Some(token.expose_secret().to_owned()),
                username: Some(username.to_owned()),
                user_id: Some(user_id.clone()),
            },
        );

        tracing::info!(username, user_id = %user_id, "Session authenticated");
        self.token = Some(token);
        self.username = Some(username.to_owned());
        self.user_id = Some(user_id);
        self.hydrated = true;
        self.identity.set_session_user(self.user_key());
    }

    /// Forget the token and identity in memory and in storage.
    pub fn clear_auth(&mut self) {
        if let Err(e) = self.storage.remove(keys::SESSION) {
            tracing::warn!(error = %e, "Failed to remove persisted session");
        }

        tracing::info!(username = ?self.username, "Session cleared");
        self.token = None;
        self.username = None;
        self.user_id = None;
        self.hydrated = true;
        self.identity.set_session_user(None);
    }

    /// Whether a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        if self.hydrated {
            return self.token.is_some();
        }
        read_record::<SessionRecord>(self.storage.as_ref(), keys::SESSION)
            .ok()
            .flatten()
            .is_some_and(|record| record.token.is_some())
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The user key this session acts as, if logged in.
    #[must_use]
    pub fn user_key(&self) -> Option<UserKey> {
        self.user_id.as_deref().and_then(|id| UserKey::parse(id).ok())
    }

    /// The credential token, for authenticated API calls.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}
