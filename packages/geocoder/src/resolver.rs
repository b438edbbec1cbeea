//! Sequential, throttled resolution of positive records to map points.
//!
//! Each pass filters to positive records, caps the volume of external
//! calls, and walks the records strictly in order: cache hits emit
//! immediately, misses wait out the rate-limit delay before issuing a
//! single lookup. Failed or empty lookups skip the record; partial
//! output is expected.
//!
//! Staleness is tracked with a generation counter instead of a shared
//! in-flight flag: every new pass bumps the generation, and a pass that
//! observes a newer generation than its own abandons its work and
//! returns nothing, so superseded results are never merged with fresh
//! ones.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use larvascan_storage::GeocodeCache;
use larvascan_survey_models::{GeocodedPoint, SurveyRecord};

use crate::{AddressLookup, address};

/// Cap on records considered per pass, bounding external-call volume.
pub const MAX_RECORDS_PER_PASS: usize = 50;

/// Fixed wait before each external lookup, respecting the public
/// Nominatim rate limit.
pub const LOOKUP_DELAY: Duration = Duration::from_millis(400);

/// Resolves positive survey records to [`GeocodedPoint`]s through the
/// cache and the external lookup.
pub struct GeocodeResolver {
    lookup: Arc<dyn AddressLookup>,
    cache: Arc<GeocodeCache>,
    generation: AtomicU64,
}

impl GeocodeResolver {
    /// Creates a resolver over the given lookup service and cache.
    #[must_use]
    pub fn new(lookup: Arc<dyn AddressLookup>, cache: Arc<GeocodeCache>) -> Self {
        Self {
            lookup,
            cache,
            generation: AtomicU64::new(0),
        }
    }

    /// The durable cache backing this resolver.
    #[must_use]
    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Marks any running pass stale without starting a new one.
    ///
    /// Called when the input record collection is replaced, so a pass
    /// still walking the old records discards its output.
    pub fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Resolves up to [`MAX_RECORDS_PER_PASS`] positive records, in
    /// input order.
    ///
    /// Starting a pass supersedes any pass still running on this
    /// resolver: the older pass notices the generation change at its
    /// next suspension point and returns an empty result instead of
    /// stale points.
    pub async fn resolve(&self, records: &[SurveyRecord]) -> Vec<GeocodedPoint> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.resolve_pass(records, generation).await
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    async fn resolve_pass(&self, records: &[SurveyRecord], generation: u64) -> Vec<GeocodedPoint> {
        let eligible: Vec<&SurveyRecord> = records
            .iter()
            .filter(|record| record.is_positive)
            .take(MAX_RECORDS_PER_PASS)
            .collect();

        if eligible.is_empty() {
            return Vec::new();
        }

        log::debug!(
            "Geocoding pass {generation}: {} positive record(s)",
            eligible.len()
        );

        let mut points = Vec::with_capacity(eligible.len());

        for record in eligible {
            if self.is_stale(generation) {
                log::debug!("Geocoding pass {generation} superseded, discarding output");
                return Vec::new();
            }

            let key = address::cache_key(record);

            if let Some(coordinates) = self.cache.get(&key) {
                points.push(GeocodedPoint {
                    record: record.clone(),
                    coordinates,
                });
                continue;
            }

            tokio::time::sleep(LOOKUP_DELAY).await;

            if self.is_stale(generation) {
                log::debug!("Geocoding pass {generation} superseded, discarding output");
                return Vec::new();
            }

            let query = address::lookup_query(record);
            match self.lookup.lookup(&query).await {
                Ok(Some(coordinates)) => {
                    if let Err(e) = self.cache.set(&key, coordinates) {
                        log::warn!("Failed to persist geocode cache entry: {e}");
                    }
                    points.push(GeocodedPoint {
                        record: record.clone(),
                        coordinates,
                    });
                }
                Ok(None) => {
                    log::debug!("No geocoding match for '{query}', skipping record");
                }
                Err(e) => {
                    log::error!("Geocoding failed for '{query}': {e}");
                }
            }
        }

        if self.is_stale(generation) {
            log::debug!("Geocoding pass {generation} superseded, discarding output");
            return Vec::new();
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use larvascan_storage::{KeyValueStore, MemoryStore};
    use larvascan_survey_models::Coordinates;

    use super::*;
    use crate::GeocodeError;

    /// Scripted lookup double: answers from a fixed map, counting calls.
    struct ScriptedLookup {
        answers: BTreeMap<String, Coordinates>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedLookup {
        fn new(answers: BTreeMap<String, Coordinates>) -> Self {
            Self {
                answers,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                answers: BTreeMap::new(),
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AddressLookup for ScriptedLookup {
        async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeocodeError::Parse {
                    message: "scripted failure".to_string(),
                });
            }
            Ok(self.answers.get(query).copied())
        }
    }

    fn positive_record(endereco: &str, numero: &str, bairro: &str) -> SurveyRecord {
        let mut record = SurveyRecord {
            endereco: endereco.to_string(),
            numero: numero.to_string(),
            bairro: bairro.to_string(),
            larva_aegypti: 1,
            ..SurveyRecord::default()
        };
        record.seal();
        record
    }

    fn negative_record(endereco: &str) -> SurveyRecord {
        let mut record = SurveyRecord {
            endereco: endereco.to_string(),
            ..SurveyRecord::default()
        };
        record.seal();
        record
    }

    fn coords(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates {
            latitude,
            longitude,
        }
    }

    fn cache() -> Arc<GeocodeCache> {
        Arc::new(GeocodeCache::open(Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>).unwrap())
    }

    fn answer_for(record: &SurveyRecord, coordinates: Coordinates) -> (String, Coordinates) {
        (address::lookup_query(record), coordinates)
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_positive_records_in_input_order() {
        let first = positive_record("Rua A", "1", "Alegre");
        let second = positive_record("Rua B", "2", "Macuco");
        let lookup = Arc::new(ScriptedLookup::new(BTreeMap::from([
            answer_for(&first, coords(-19.1, -42.1)),
            answer_for(&second, coords(-19.2, -42.2)),
        ])));
        let resolver = GeocodeResolver::new(Arc::clone(&lookup) as Arc<dyn AddressLookup>, cache());

        let points = resolver
            .resolve(&[first.clone(), second.clone()])
            .await;

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].record.endereco, "Rua A");
        assert_eq!(points[1].record.endereco, "Rua B");
        assert_eq!(lookup.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn never_emits_points_for_negative_records() {
        let positive = positive_record("Rua A", "1", "Alegre");
        let lookup = Arc::new(ScriptedLookup::new(BTreeMap::from([answer_for(
            &positive,
            coords(-19.1, -42.1),
        )])));
        let resolver = GeocodeResolver::new(Arc::clone(&lookup) as Arc<dyn AddressLookup>, cache());

        let points = resolver
            .resolve(&[negative_record("Rua X"), positive.clone()])
            .await;

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].record.endereco, "Rua A");
    }

    #[tokio::test(start_paused = true)]
    async fn caps_a_pass_at_fifty_records() {
        let records: Vec<SurveyRecord> = (0..60)
            .map(|i| positive_record(&format!("Rua {i}"), "1", "Alegre"))
            .collect();
        let answers: BTreeMap<String, Coordinates> = records
            .iter()
            .map(|r| answer_for(r, coords(-19.0, -42.0)))
            .collect();
        let lookup = Arc::new(ScriptedLookup::new(answers));
        let resolver = GeocodeResolver::new(Arc::clone(&lookup) as Arc<dyn AddressLookup>, cache());

        let points = resolver.resolve(&records).await;

        assert_eq!(points.len(), MAX_RECORDS_PER_PASS);
        assert_eq!(lookup.call_count(), MAX_RECORDS_PER_PASS);
    }

    #[tokio::test(start_paused = true)]
    async fn second_pass_is_served_entirely_from_cache() {
        let record = positive_record("Rua A", "1", "Alegre");
        let lookup = Arc::new(ScriptedLookup::new(BTreeMap::from([answer_for(
            &record,
            coords(-19.1, -42.1),
        )])));
        let resolver = GeocodeResolver::new(Arc::clone(&lookup) as Arc<dyn AddressLookup>, cache());

        let first = resolver.resolve(std::slice::from_ref(&record)).await;
        let second = resolver.resolve(std::slice::from_ref(&record)).await;

        assert_eq!(first, second);
        assert_eq!(lookup.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_addresses_resolve_with_one_external_call() {
        let mut first = positive_record("Rua A", "1", "Alegre");
        first.identificacao = "1".to_string();
        let mut second = positive_record("Rua A", "1", "Alegre");
        second.identificacao = "2".to_string();

        let lookup = Arc::new(ScriptedLookup::new(BTreeMap::from([answer_for(
            &first,
            coords(-19.1, -42.1),
        )])));
        let resolver = GeocodeResolver::new(Arc::clone(&lookup) as Arc<dyn AddressLookup>, cache());

        let points = resolver.resolve(&[first, second]).await;

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].coordinates, points[1].coordinates);
        assert_eq!(lookup.call_count(), 1);
        assert_eq!(resolver.cache().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookups_skip_the_record_silently() {
        let record = positive_record("Rua A", "1", "Alegre");
        let lookup = Arc::new(ScriptedLookup::failing());
        let resolver = GeocodeResolver::new(Arc::clone(&lookup) as Arc<dyn AddressLookup>, cache());

        let points = resolver.resolve(std::slice::from_ref(&record)).await;

        assert!(points.is_empty());
        assert_eq!(lookup.call_count(), 1);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_lookup_result_emits_nothing_and_caches_nothing() {
        let record = positive_record("Rua Sem Match", "9", "Alegre");
        let lookup = Arc::new(ScriptedLookup::new(BTreeMap::new()));
        let resolver = GeocodeResolver::new(Arc::clone(&lookup) as Arc<dyn AddressLookup>, cache());

        let points = resolver.resolve(std::slice::from_ref(&record)).await;

        assert!(points.is_empty());
        assert!(resolver.cache().is_empty());

        // No retry within a later pass either: the miss is not cached,
        // so a new pass issues a fresh lookup.
        resolver.resolve(std::slice::from_ref(&record)).await;
        assert_eq!(lookup.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_pass_discards_its_output() {
        let record = positive_record("Rua A", "1", "Alegre");
        let lookup = Arc::new(ScriptedLookup::new(BTreeMap::from([answer_for(
            &record,
            coords(-19.1, -42.1),
        )])));
        let resolver = GeocodeResolver::new(Arc::clone(&lookup) as Arc<dyn AddressLookup>, cache());

        let stale_generation = resolver.generation.load(Ordering::SeqCst);
        // A newer pass begins before the stale one runs.
        resolver.generation.fetch_add(1, Ordering::SeqCst);

        let points = resolver
            .resolve_pass(std::slice::from_ref(&record), stale_generation)
            .await;

        assert!(points.is_empty());
        assert_eq!(lookup.call_count(), 0);
    }
}
