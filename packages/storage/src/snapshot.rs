//! Persistence of the last-loaded record collection.
//!
//! The full record set is re-serialized after each ingestion and read
//! back once at startup, so a restarted process resumes with the data
//! from the previous session. A corrupt snapshot is removed and the
//! process starts with no data; prior ingestions are not retried.

use larvascan_survey_models::SurveyRecord;

use crate::{KeyValueStore, StorageError};

/// Store key holding the serialized record collection.
pub const SNAPSHOT_KEY: &str = "larvascan_last_data_raw";

/// Loads the persisted record collection, if any.
///
/// A missing entry yields an empty collection. A corrupt entry is
/// logged, removed from the store, and also yields an empty collection;
/// corruption is never fatal.
///
/// # Errors
///
/// Returns [`StorageError`] only if the store itself cannot be read.
pub fn load_records(store: &dyn KeyValueStore) -> Result<Vec<SurveyRecord>, StorageError> {
    let Some(raw) = store.get(SNAPSHOT_KEY)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
        Ok(records) => Ok(records),
        Err(e) => {
            log::error!("Discarding corrupt record snapshot: {e}");
            store.remove(SNAPSHOT_KEY)?;
            Ok(Vec::new())
        }
    }
}

/// Persists the record collection, replacing any previous snapshot.
///
/// # Errors
///
/// Returns [`StorageError`] if serialization or the store write fails.
pub fn save_records(
    store: &dyn KeyValueStore,
    records: &[SurveyRecord],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(records)?;
    store.set(SNAPSHOT_KEY, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn missing_snapshot_loads_as_empty() {
        let store = MemoryStore::new();
        assert!(load_records(&store).unwrap().is_empty());
    }

    #[test]
    fn snapshot_round_trips() {
        let store = MemoryStore::new();
        let mut record = SurveyRecord {
            endereco: "Rua A".to_string(),
            larva_aegypti: 1,
            ..SurveyRecord::default()
        };
        record.seal();

        save_records(&store, &[record.clone()]).unwrap();
        let loaded = load_records(&store).unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn corrupt_snapshot_is_removed_and_loads_as_empty() {
        let store = MemoryStore::new();
        store.set(SNAPSHOT_KEY, "[{broken").unwrap();

        assert!(load_records(&store).unwrap().is_empty());
        // The bad entry is cleared so the next load doesn't re-parse it.
        assert_eq!(store.get(SNAPSHOT_KEY).unwrap(), None);
    }
}
