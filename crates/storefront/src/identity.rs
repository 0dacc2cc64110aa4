//! Current-user resolution.
//!
//! Every per-user store operation goes through [`IdentityResolver::resolve`]:
//!
//! 1. an explicit key supplied by the caller, if it is a valid [`UserKey`]
//! 2. the logged-in user ID: the live session's when this process has one,
//!    otherwise the one persisted by the last login
//! 3. [`UserKey::guest`]
//!
//! Missing identity never fails; anonymous visitors get the guest basket.
//! Clones share the live session user, so a resolver handed to the stores
//! follows logins made through an [`AuthSession`](crate::session::AuthSession)
//! built from the same resolver even when the session record cannot be
//! written.

use std::sync::{Arc, PoisonError, RwLock};

use shopfront_core::UserKey;

use crate::session::SessionRecord;
use crate::storage::{Storage, keys, read_record};

/// What this process knows about the logged-in user.
#[derive(Debug, Clone, Default)]
enum SessionUser {
    /// No session loaded here; ask durable storage.
    #[default]
    Unknown,
    LoggedOut,
    LoggedIn(UserKey),
}

/// Resolves the user key that partitions basket and favorites state.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    storage: Arc<dyn Storage>,
    session_user: Arc<RwLock<SessionUser>>,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            session_user: Arc::default(),
        }
    }

    /// Resolve `explicit` through the fallback chain. Blank keys count as
    /// absent.
    #[must_use]
    pub fn resolve(&self, explicit: Option<&str>) -> UserKey {
        explicit
            .and_then(|key| UserKey::parse(key).ok())
            .or_else(|| self.session_user())
            .unwrap_or_else(UserKey::guest)
    }

    /// The logged-in user, preferring the live session over storage.
    #[must_use]
    pub fn session_user(&self) -> Option<UserKey> {
        let live = self
            .session_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match live {
            SessionUser::LoggedIn(key) => Some(key),
            SessionUser::LoggedOut => None,
            SessionUser::Unknown => self.persisted(),
        }
    }

    /// The user ID stored by the last successful login, if any.
    #[must_use]
    pub fn persisted(&self) -> Option<UserKey> {
        match read_record::<SessionRecord>(self.storage.as_ref(), keys::SESSION) {
            Ok(record) => record?.user_id.and_then(|id| UserKey::parse(&id).ok()),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable session record");
                None
            }
        }
    }

    /// Record the live session user; `None` means logged out.
    pub(crate) fn set_session_user(&self, user: Option<UserKey>) {
        let mut live = self
            .session_user
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *live = user.map_or(SessionUser::LoggedOut, SessionUser::LoggedIn);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, write_record};

    fn resolver_with_user(user_id: Option<&str>) -> IdentityResolver {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        if let Some(id) = user_id {
            let record = SessionRecord {
                token: Some("t".to_string()),
                username: Some(id.to_string()),
                user_id: Some(id.to_string()),
            };
            write_record(storage.as_ref(), keys::SESSION, &record).unwrap();
        }
        IdentityResolver::new(storage)
    }

    #[test]
    fn test_explicit_key_wins() {
        let resolver = resolver_with_user(Some("stored"));
        assert_eq!(resolver.resolve(Some("alice")).as_str(), "alice");
    }

    #[test]
    fn test_falls_back_to_persisted() {
        let resolver = resolver_with_user(Some("stored"));
        assert_eq!(resolver.resolve(None).as_str(), "stored");
        assert_eq!(resolver.resolve(Some("  ")).as_str(), "stored");
    }

    #[test]
    fn test_falls_back_to_guest() {
        let resolver = resolver_with_user(None);
        assert!(resolver.resolve(None).is_guest());
        assert!(resolver.resolve(Some("")).is_guest());
    }

    #[test]
    fn test_corrupt_session_record_means_guest() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::SESSION, "garbage").unwrap();
        let resolver = IdentityResolver::new(storage);
        assert!(resolver.resolve(None).is_guest());
    }

    #[test]
    fn test_live_session_user_beats_storage() {
        let resolver = resolver_with_user(Some("stored"));
        let shared = resolver.clone();

        shared.set_session_user(UserKey::parse("alice").ok());
        assert_eq!(resolver.resolve(None).as_str(), "alice");

        shared.set_session_user(None);
        assert!(resolver.resolve(None).is_guest());
        assert_eq!(resolver.persisted().unwrap().as_str(), "stored");
    }
}
