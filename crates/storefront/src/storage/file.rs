//! File-backed storage backend.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{Storage, StorageError};

/// Stores each record as `<dir>/<key>.json`.
///
/// Writes go to a uniquely named temporary sibling that is synced and then
/// renamed into place, so a crash mid-write leaves the previous document
/// intact. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a store rooted at `dir`. Nothing is touched until first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().join("nested/data"));

        assert!(storage.get("basket-storage").unwrap().is_none());
        storage.set("basket-storage", "{}").unwrap();
        assert_eq!(
            storage.get("basket-storage").unwrap().as_deref(),
            Some("{}")
        );
        assert!(tmp.path().join("nested/data/basket-storage.json").exists());
    }

    #[test]
    fn test_interleaved_writers_leave_only_records() {
        let tmp = tempfile::tempdir().unwrap();
        let first = FileStorage::new(tmp.path());
        let second = FileStorage::new(tmp.path());

        for i in 0..20 {
            first.set("basket-storage", &format!("a{i}")).unwrap();
            second.set("basket-storage", &format!("b{i}")).unwrap();
            second.set("auth-storage", &format!("s{i}")).unwrap();
        }
        assert_eq!(first.get("basket-storage").unwrap().as_deref(), Some("b19"));
        assert_eq!(first.get("auth-storage").unwrap().as_deref(), Some("s19"));

        let mut names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["auth-storage.json", "basket-storage.json"]);
    }

    #[test]
    fn test_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_remove_absent_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        assert!(storage.remove("never-written").is_ok());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let storage = FileStorage::new("unused");
        for key in ["", "../escape", "a/b", "dot.json"] {
            assert!(matches!(
                storage.get(key),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
