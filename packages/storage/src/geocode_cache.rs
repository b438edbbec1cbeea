//! Durable address → coordinate cache shared across geocoding passes.
//!
//! Entries never expire and are never evicted: the address space of a
//! single municipality is small and stable, so the cache only grows
//! with genuinely new addresses. A key is only overwritten by a fresh
//! successful lookup, which in practice produces the same coordinate,
//! making writes idempotent. That idempotence is what lets concurrent
//! passes share the cache without mutual exclusion.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use larvascan_survey_models::Coordinates;

use crate::{KeyValueStore, StorageError};

/// Store key holding the serialized cache map.
pub const GEOCACHE_KEY: &str = "larvascan_geocache";

/// The geocode cache: an in-memory map mirrored write-through into the
/// injected [`KeyValueStore`], so every `set` is immediately durable.
pub struct GeocodeCache {
    store: Arc<dyn KeyValueStore>,
    entries: Mutex<BTreeMap<String, Coordinates>>,
}

impl GeocodeCache {
    /// Opens the cache, loading any persisted entries.
    ///
    /// A corrupt persisted map is logged, removed from the store, and
    /// the cache starts empty; addresses will simply be re-geocoded.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only if the store itself cannot be read.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let entries = match store.get(GEOCACHE_KEY)? {
            None => BTreeMap::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    log::error!("Discarding corrupt geocode cache: {e}");
                    store.remove(GEOCACHE_KEY)?;
                    BTreeMap::new()
                }
            },
        };

        Ok(Self {
            store,
            entries: Mutex::new(entries),
        })
    }

    /// Looks up a cached coordinate by normalized address key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Coordinates> {
        self.entries
            .lock()
            .map_or(None, |entries| entries.get(key).copied())
    }

    /// Caches a coordinate under `key` and persists immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the store write
    /// fails; the in-memory entry is kept either way so the current
    /// pass still benefits from it.
    pub fn set(&self, key: &str, coordinates: Coordinates) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), coordinates);
        let raw = serde_json::to_string(&*entries)?;
        drop(entries);
        self.store.set(GEOCACHE_KEY, &raw)
    }

    /// Number of cached addresses.
    ///
    /// Reads on a poisoned mutex degrade to an empty view, matching
    /// [`Self::get`]; only writes surface poisoning as an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn coords(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates {
            latitude,
            longitude,
        }
    }

    #[test]
    fn get_misses_on_empty_cache() {
        let cache = GeocodeCache::open(Arc::new(MemoryStore::new())).unwrap();
        assert!(cache.get("rua a, 1, alegre, timoteo").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn set_is_visible_to_get_and_persisted() {
        let store = Arc::new(MemoryStore::new());
        let cache = GeocodeCache::open(Arc::clone(&store) as Arc<dyn KeyValueStore>).unwrap();

        cache
            .set("rua a, 1, alegre, timoteo", coords(-19.58, -42.64))
            .unwrap();

        assert_eq!(
            cache.get("rua a, 1, alegre, timoteo"),
            Some(coords(-19.58, -42.64))
        );

        // A fresh cache over the same store sees the entry.
        let reopened = GeocodeCache::open(store as Arc<dyn KeyValueStore>).unwrap();
        assert_eq!(
            reopened.get("rua a, 1, alegre, timoteo"),
            Some(coords(-19.58, -42.64))
        );
    }

    #[test]
    fn overwriting_a_key_keeps_a_single_entry() {
        let cache = GeocodeCache::open(Arc::new(MemoryStore::new())).unwrap();
        cache.set("k", coords(1.0, 2.0)).unwrap();
        cache.set("k", coords(1.0, 2.0)).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn poisoned_mutex_degrades_reads_and_errors_writes() {
        let cache = GeocodeCache::open(Arc::new(MemoryStore::new())).unwrap();
        cache.set("k", coords(1.0, 2.0)).unwrap();

        let poisoning = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cache.entries.lock().unwrap();
            panic!("poison the cache mutex");
        }));
        assert!(poisoning.is_err());

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert!(matches!(
            cache.set("k", coords(1.0, 2.0)),
            Err(StorageError::Poisoned)
        ));
    }

    #[test]
    fn corrupt_persisted_cache_is_cleared() {
        let store = Arc::new(MemoryStore::new());
        store.set(GEOCACHE_KEY, "{oops").unwrap();

        let cache = GeocodeCache::open(Arc::clone(&store) as Arc<dyn KeyValueStore>).unwrap();
        assert!(cache.is_empty());
        assert_eq!(store.get(GEOCACHE_KEY).unwrap(), None);
    }
}
