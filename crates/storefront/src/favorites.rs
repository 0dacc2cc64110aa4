//! Per-user favorites lists.
//!
//! Favoriting is an on/off relation, so [`FavoritesStore::toggle`] is the
//! only per-entry mutator. Entries are unique by product ID and kept in the
//! order they were liked.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopfront_core::{FavoriteEntry, ProductId, UserKey};

use crate::identity::IdentityResolver;
use crate::storage::{Storage, decode_rows, keys, load_record, save_record};

#[derive(Debug, Default, Deserialize)]
struct FavoritesRecord {
    #[serde(default)]
    user_favorites: BTreeMap<String, serde_json::Value>,
}

#[derive(Serialize)]
struct FavoritesRecordRef<'a> {
    user_favorites: &'a BTreeMap<UserKey, Vec<FavoriteEntry>>,
}

/// Favorites table keyed by user.
#[derive(Debug)]
pub struct FavoritesStore {
    storage: Arc<dyn Storage>,
    identity: IdentityResolver,
    favorites: BTreeMap<UserKey, Vec<FavoriteEntry>>,
}

impl FavoritesStore {
    /// Restore the favorites table from storage.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let identity = IdentityResolver::new(Arc::clone(&storage));
        Self::with_identity(storage, identity)
    }

    /// Restore from storage, resolving users through `identity`.
    #[must_use]
    pub fn with_identity(storage: Arc<dyn Storage>, identity: IdentityResolver) -> Self {
        let record: FavoritesRecord = load_record(storage.as_ref(), keys::FAVORITES);

        let mut favorites: BTreeMap<UserKey, Vec<FavoriteEntry>> = BTreeMap::new();
        let rows = decode_rows::<FavoriteEntry>(keys::FAVORITES, record.user_favorites);
        for (user, entries) in rows {
            let Ok(key) = UserKey::parse(&user) else {
                tracing::warn!(user = %user, "Dropping favorites stored under an invalid user key");
                continue;
            };
            let list = favorites.entry(key).or_default();
            for entry in entries {
                if !list.iter().any(|f| f.id == entry.id) {
                    list.push(entry);
                }
            }
        }

        Self {
            identity,
            storage,
            favorites,
        }
    }

    /// Favorites for `user`, defaulting to the current user.
    #[must_use]
    pub fn all(&self, user: Option<&str>) -> &[FavoriteEntry] {
        let key = self.identity.resolve(user);
        self.favorites
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Add `entry` if absent, otherwise remove it.
    ///
    /// Returns whether the product is a favorite afterwards.
    pub fn toggle(&mut self, entry: FavoriteEntry, user: Option<&str>) -> bool {
        let key = self.identity.resolve(user);
        let list = self.favorites.entry(key.clone()).or_default();

        let now_favorite = if let Some(pos) = list.iter().position(|f| f.id == entry.id) {
            list.remove(pos);
            false
        } else {
            list.push(entry.clone());
            true
        };

        tracing::debug!(user = %key, product_id = %entry.id, now_favorite, "Toggled favorite");
        self.persist();
        now_favorite
    }

    #[must_use]
    pub fn is_favorite(&self, id: &ProductId, user: Option<&str>) -> bool {
        self.all(user).iter().any(|f| &f.id == id)
    }

    #[must_use]
    pub fn count(&self, user: Option<&str>) -> usize {
        self.all(user).len()
    }

    /// Remove the user's whole favorites list.
    pub fn clear_favorites(&mut self, user: Option<&str>) {
        let key = self.identity.resolve(user);
        self.favorites.remove(&key);

        tracing::debug!(user = %key, "Cleared favorites");
        self.persist();
    }

    fn persist(&self) {
        save_record(
            self.storage.as_ref(),
            keys::FAVORITES,
            &FavoritesRecordRef {
                user_favorites: &self.favorites,
            },
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::{Price, ProductRef};

    use super::*;
    use crate::storage::MemoryStorage;

    fn entry(id: &str) -> FavoriteEntry {
        ProductRef::new(id, format!("Item {id}")).with_price(Price::from_cents(999))
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut favs = FavoritesStore::load(Arc::new(MemoryStorage::new()));
        assert!(favs.toggle(entry("1"), Some("alice")));
        assert!(favs.is_favorite(&ProductId::from("1"), Some("alice")));

        assert!(!favs.toggle(entry("1"), Some("alice")));
        assert!(!favs.is_favorite(&ProductId::from("1"), Some("alice")));
    }

    #[test]
    fn test_double_toggle_restores_original_list() {
        let mut favs = FavoritesStore::load(Arc::new(MemoryStorage::new()));
        favs.toggle(entry("1"), Some("alice"));
        favs.toggle(entry("2"), Some("alice"));
        let before = favs.all(Some("alice")).to_vec();

        favs.toggle(entry("3"), Some("alice"));
        favs.toggle(entry("3"), Some("alice"));
        assert_eq!(favs.all(Some("alice")), before.as_slice());
    }

    #[test]
    fn test_defaults_to_guest() {
        let mut favs = FavoritesStore::load(Arc::new(MemoryStorage::new()));
        favs.toggle(entry("1"), None);
        assert_eq!(favs.count(Some("guest")), 1);
        assert_eq!(favs.count(Some("alice")), 0);
    }

    #[test]
    fn test_clear_favorites() {
        let mut favs = FavoritesStore::load(Arc::new(MemoryStorage::new()));
        favs.toggle(entry("1"), Some("alice"));
        favs.toggle(entry("2"), Some("bob"));
        favs.clear_favorites(Some("alice"));

        assert!(favs.all(Some("alice")).is_empty());
        assert_eq!(favs.count(Some("bob")), 1);
    }

    #[test]
    fn test_persisted_across_loads() {
        let storage = Arc::new(MemoryStorage::new());
        let mut favs = FavoritesStore::load(storage.clone());
        favs.toggle(entry("1"), Some("alice"));
        favs.toggle(entry("2"), Some("alice"));

        let restored = FavoritesStore::load(storage);
        let ids: Vec<&str> = restored
            .all(Some("alice"))
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn test_load_collapses_duplicates() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                keys::FAVORITES,
                r#"{"state":{"user_favorites":{"alice":[
                    {"id":"1","name":"First"},
                    {"id":"1","name":"Second"}
                ]}},"version":0}"#,
            )
            .unwrap();

        let favs = FavoritesStore::load(storage);
        let all = favs.all(Some("alice"));
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "First");
    }

    #[test]
    fn test_load_keeps_other_users_when_a_row_is_bad() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                keys::FAVORITES,
                r#"{"state":{"user_favorites":{
                    "alice":[{"id":"1","name":"Lamp"}],
                    "bob":[{"id":"2","name":"Rug","price":-3},{"id":"3","name":"Vase"}]
                }},"version":0}"#,
            )
            .unwrap();

        let favs = FavoritesStore::load(storage);
        assert_eq!(favs.count(Some("alice")), 1);
        assert!(!favs.is_favorite(&ProductId::from("2"), Some("bob")));
        assert!(favs.is_favorite(&ProductId::from("3"), Some("bob")));
    }
}
