#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! String-keyed persistent storage port and the layers built on it.
//!
//! [`KeyValueStore`] is the only durability abstraction in the
//! workspace: a flat `get`/`set`/`remove` by string key with no further
//! assumptions. It is initialized once at process start and injected
//! into the callers that need persistence, never accessed ad hoc.
//!
//! Two layers sit on top:
//! - [`snapshot`] — the last-loaded record collection, re-read at
//!   startup with defensive fallback on corruption.
//! - [`geocode_cache`] — the durable address → coordinate cache shared
//!   across geocoding passes.

pub mod geocode_cache;
pub mod snapshot;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

pub use geocode_cache::GeocodeCache;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The store mutex was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A durable string-keyed store: `get`/`set`/`remove`, nothing more.
///
/// Writes must be visible to subsequent reads, including across process
/// restarts for file-backed implementations.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the underlying store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, persisted immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the entry under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed [`KeyValueStore`]: one JSON object per store file,
/// loaded at open and rewritten on every mutation.
///
/// The address space is small and stable (a snapshot entry plus one
/// cache entry), so rewriting the whole file per `set` is fine.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens (or creates) the store file at `path`.
    ///
    /// A corrupt store file is logged and replaced with an empty store
    /// rather than failing startup; prior data is unrecoverable at that
    /// point anyway.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the parent directory cannot be
    /// created or the file cannot be read.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!(
                        "Store file {} is corrupt ({e}), starting empty",
                        path.display()
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// In-memory [`KeyValueStore`] for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn file_store_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("missing").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
    }

    #[test]
    fn corrupt_store_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn memory_store_behaves_like_a_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
