//! Durable key-value storage for the persisted stores.
//!
//! # Architecture
//!
//! The basket, favorites and session stores never touch a backend directly.
//! They read a snapshot through the [`Storage`] port at construction and
//! write the whole snapshot back after every mutation.
//!
//! - [`MemoryStorage`] - process-local map, used by tests and ephemeral runs
//! - [`FileStorage`] - one JSON document per record under a data directory
//!
//! Each record is wrapped in a versioned envelope:
//!
//! ```json
//! { "state": { ... }, "version": 0 }
//! ```
//!
//! Several processes sharing one data directory are not reconciled: the last
//! writer wins.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Current version of every persisted record.
pub const RECORD_VERSION: u32 = 0;

/// Record names used by the stores.
pub mod keys {
    /// Auth session: token, username and user ID.
    pub const SESSION: &str = "auth-storage";

    /// Basket table: line items per user key.
    pub const BASKET: &str = "basket-storage";

    /// Favorites table: favorite entries per user key.
    pub const FAVORITES: &str = "favorites-storage";
}

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized.
    #[error("failed to serialize record {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Record could not be decoded.
    #[error("failed to decode record {key}: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Record name contains characters the backend cannot store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A durable string key-value store.
///
/// All methods take `&self`; implementations use interior mutability.
pub trait Storage: Send + Sync + Debug {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

#[derive(serde::Deserialize)]
struct Envelope<T> {
    state: T,
    version: u32,
}

/// Read and decode a record.
///
/// # Errors
///
/// Returns an error if the backend fails or the document does not decode.
/// A record written under a different [`RECORD_VERSION`] reads as `None`.
pub fn read_record<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };

    let envelope: Envelope<T> =
        serde_json::from_str(&raw).map_err(|source| StorageError::Deserialize {
            key: key.to_owned(),
            source,
        })?;

    if envelope.version != RECORD_VERSION {
        tracing::warn!(
            key,
            found = envelope.version,
            expected = RECORD_VERSION,
            "Discarding record with unknown version"
        );
        return Ok(None);
    }

    Ok(Some(envelope.state))
}

/// Encode and write a record.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn write_record<T: Serialize>(
    storage: &dyn Storage,
    key: &str,
    state: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(&EnvelopeRef {
        state,
        version: RECORD_VERSION,
    })
    .map_err(|source| StorageError::Serialize {
        key: key.to_owned(),
        source,
    })?;
    storage.set(key, &json)
}

/// Restore a record, starting from the default on any failure.
///
/// Stores call this at construction; a corrupt record must not prevent the
/// storefront from starting.
pub fn load_record<T: DeserializeOwned + Default>(storage: &dyn Storage, key: &str) -> T {
    match read_record(storage, key) {
        Ok(Some(state)) => state,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable record");
            T::default()
        }
    }
}

/// Write a record through, logging instead of failing.
///
/// The in-memory state stays authoritative when the write fails.
pub fn save_record<T: Serialize>(storage: &dyn Storage, key: &str, state: &T) {
    if let Err(e) = write_record(storage, key, state) {
        tracing::warn!(key, error = %e, "Failed to persist record");
    }
}

/// Decode a per-user table row by row.
///
/// Rows that do not decode, and entries that are not lists, are dropped
/// with a warning so one bad row cannot discard the other users' data.
pub fn decode_rows<T: DeserializeOwned>(
    key: &str,
    table: BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, Vec<T>> {
    table
        .into_iter()
        .map(|(user, rows)| {
            let serde_json::Value::Array(rows) = rows else {
                tracing::warn!(key, user = %user, "Dropping table entry that is not a list");
                return (user, Vec::new());
            };
            let decoded = rows
                .into_iter()
                .filter_map(|row| {
                    serde_json::from_value(row)
                        .inspect_err(|e| {
                            tracing::warn!(key, user = %user, error = %e, "Dropping undecodable row");
                        })
                        .ok()
                })
                .collect();
            (user, decoded)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_record() {
        let storage = MemoryStorage::new();
        let mut state = BTreeMap::new();
        state.insert("alice".to_string(), 3_u32);

        write_record(&storage, keys::BASKET, &state).unwrap();
        let raw = storage.get(keys::BASKET).unwrap().unwrap();
        assert_eq!(raw, r#"{"state":{"alice":3},"version":0}"#);

        let back: BTreeMap<String, u32> = read_record(&storage, keys::BASKET).unwrap().unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_read_missing_record() {
        let storage = MemoryStorage::new();
        let value: Option<u32> = read_record(&storage, keys::SESSION).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_unknown_version_reads_as_none() {
        let storage = MemoryStorage::new();
        storage
            .set(keys::FAVORITES, r#"{"state":5,"version":7}"#)
            .unwrap();
        let value: Option<u32> = read_record(&storage, keys::FAVORITES).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_corrupt_record_loads_default() {
        let storage = MemoryStorage::new();
        storage.set(keys::BASKET, "{not json").unwrap();
        assert!(matches!(
            read_record::<u32>(&storage, keys::BASKET),
            Err(StorageError::Deserialize { .. })
        ));
        let value: Vec<u32> = load_record(&storage, keys::BASKET);
        assert!(value.is_empty());
    }

    #[test]
    fn test_decode_rows_drops_only_bad_rows() {
        let table: BTreeMap<String, serde_json::Value> = serde_json::from_str(
            r#"{"alice":[1,2],"bob":[3,-1,"x"],"carol":7}"#,
        )
        .unwrap();

        let rows: BTreeMap<String, Vec<u32>> = decode_rows(keys::BASKET, table);
        assert_eq!(rows["alice"], vec![1, 2]);
        assert_eq!(rows["bob"], vec![3]);
        assert!(rows["carol"].is_empty());
    }
}
