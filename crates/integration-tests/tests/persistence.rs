//! Integration tests for file-backed persistence across restarts.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::SecretString;
use shopfront::basket::BasketStore;
use shopfront::favorites::FavoritesStore;
use shopfront::identity::IdentityResolver;
use shopfront::session::AuthSession;
use shopfront::storage::{FileStorage, Storage};
use shopfront_core::{Price, ProductId, ProductRef};

fn file_storage(dir: &tempfile::TempDir) -> Arc<dyn Storage> {
    Arc::new(FileStorage::new(dir.path()))
}

fn lamp() -> ProductRef {
    ProductRef::new("1", "Lamp").with_price(Price::from_cents(1250))
}

#[test]
fn test_baskets_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut basket = BasketStore::load(file_storage(&dir));
        basket.add_item(lamp(), Some("alice"));
        basket.add_item(lamp(), Some("alice"));
        basket.add_item(ProductRef::new("2", "Rug"), Some("bob"));
        basket.add_item(ProductRef::new("3", "Vase"), None);
    }

    let basket = BasketStore::load(file_storage(&dir));
    assert_eq!(basket.quantity_of(&ProductId::from("1"), Some("alice")), 2);
    assert_eq!(basket.total_price(Some("alice")), Price::from_cents(2500));
    assert_eq!(basket.items(Some("bob")).len(), 1);
    assert!(basket.contains(&ProductId::from("3"), Some("guest")));
    assert!(dir.path().join("basket-storage.json").exists());
}

#[test]
fn test_favorites_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut favorites = FavoritesStore::load(file_storage(&dir));
        favorites.toggle(lamp(), Some("alice"));
        favorites.toggle(ProductRef::new("2", "Rug"), Some("alice"));
        favorites.toggle(ProductRef::new("2", "Rug"), Some("alice"));
    }

    let favorites = FavoritesStore::load(file_storage(&dir));
    assert_eq!(favorites.count(Some("alice")), 1);
    assert!(favorites.is_favorite(&ProductId::from("1"), Some("alice")));
}

#[test]
fn test_login_routes_stores_to_user_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = AuthSession::restored(file_storage(&dir));
        session.set_auth(SecretString::from("tok"), "alice", None);
    }

    let storage = file_storage(&dir);
    let session = AuthSession::restored(Arc::clone(&storage));
    assert!(session.is_authenticated());
    assert_eq!(session.username(), Some("alice"));

    let resolver = IdentityResolver::new(Arc::clone(&storage));
    assert_eq!(resolver.resolve(None).as_str(), "alice");

    let mut basket = BasketStore::load(storage);
    basket.add_item(lamp(), None);
    assert_eq!(basket.item_count(Some("alice")), 1);
    assert_eq!(basket.item_count(Some("guest")), 0);
}

#[test]
fn test_unrestored_session_reads_storage() {
    let dir = tempfile::tempdir().unwrap();
    let before_login = AuthSession::new(file_storage(&dir));
    assert!(!before_login.is_authenticated());

    AuthSession::restored(file_storage(&dir)).set_auth(SecretString::from("tok"), "alice", None);
    assert!(before_login.is_authenticated());
}

#[test]
fn test_logout_falls_back_to_guest() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_storage(&dir);
    let mut session = AuthSession::restored(Arc::clone(&storage));
    session.set_auth(SecretString::from("tok"), "alice", None);

    let mut basket = BasketStore::load(Arc::clone(&storage));
    basket.add_item(lamp(), None);
    session.clear_auth();
    basket.add_item(ProductRef::new("2", "Rug"), None);

    let basket = BasketStore::load(storage);
    assert_eq!(basket.item_count(Some("alice")), 1);
    assert_eq!(basket.item_count(Some("guest")), 1);
    assert!(!AuthSession::restored(file_storage(&dir)).is_authenticated());
}

#[test]
fn test_corrupt_record_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("basket-storage.json"), "{ not json").unwrap();

    let mut basket = BasketStore::load(file_storage(&dir));
    assert_eq!(basket.item_count(Some("alice")), 0);

    basket.add_item(lamp(), Some("alice"));
    let basket = BasketStore::load(file_storage(&dir));
    assert_eq!(basket.item_count(Some("alice")), 1);
}

#[test]
fn test_unknown_record_version_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("favorites-storage.json"),
        r#"{"state":{"user_favorites":{"alice":[{"id":"1","name":"Lamp"}]}},"version":7}"#,
    )
    .unwrap();

    let favorites = FavoritesStore::load(file_storage(&dir));
    assert_eq!(favorites.count(Some("alice")), 0);
}

#[test]
fn test_hand_written_record_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("basket-storage.json"),
        r#"{"state":{"user_baskets":{
            "alice":[
                {"id":"1","name":"Lamp","price":"12.50","quantity":1},
                {"id":"1","name":"Lamp","price":"12.50","quantity":2},
                {"id":"2","name":"Rug","quantity":0}
            ],
            "   ":[{"id":"3","name":"Vase","quantity":1}]
        }},"version":0}"#,
    )
    .unwrap();

    let basket = BasketStore::load(file_storage(&dir));
    assert_eq!(basket.items(Some("alice")).len(), 1);
    assert_eq!(basket.quantity_of(&ProductId::from("1"), Some("alice")), 3);
    assert_eq!(basket.users().count(), 1);
}
