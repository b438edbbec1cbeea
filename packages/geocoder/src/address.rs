//! Address key derivation and lookup-query construction.
//!
//! The cache key is a deterministic normalization of the address
//! fields, so identical addresses always hit the same cache entry
//! regardless of which record they came from.

use larvascan_survey_models::SurveyRecord;

/// Municipality qualifier appended to every cache key.
const KEY_MUNICIPALITY: &str = "timoteo";

/// Municipality/state/country suffix for external lookup queries.
const QUERY_SUFFIX: &str = "Timóteo, MG, Brasil";

/// Derives the normalized cache key for a record's address:
/// lowercase `street, number, neighborhood, timoteo` with runs of
/// whitespace collapsed.
#[must_use]
pub fn cache_key(record: &SurveyRecord) -> String {
    let raw = format!(
        "{}, {}, {}, {KEY_MUNICIPALITY}",
        record.endereco, record.numero, record.bairro
    );
    normalize(&raw)
}

/// Builds the free-text query sent to the external lookup service.
#[must_use]
pub fn lookup_query(record: &SurveyRecord) -> String {
    format!(
        "{}, {}, {}, {QUERY_SUFFIX}",
        record.endereco.trim(),
        record.numero.trim(),
        record.bairro.trim()
    )
}

/// Lowercases and collapses whitespace so cosmetic differences in the
/// field sheets ("Rua  A" vs "rua a") map to one key.
fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(endereco: &str, numero: &str, bairro: &str) -> SurveyRecord {
        SurveyRecord {
            endereco: endereco.to_string(),
            numero: numero.to_string(),
            bairro: bairro.to_string(),
            ..SurveyRecord::default()
        }
    }

    #[test]
    fn key_is_case_insensitive() {
        let a = cache_key(&record("Rua das Flores", "100", "Alegre"));
        let b = cache_key(&record("RUA DAS FLORES", "100", "ALEGRE"));
        assert_eq!(a, b);
        assert_eq!(a, "rua das flores, 100, alegre, timoteo");
    }

    #[test]
    fn key_collapses_whitespace() {
        let a = cache_key(&record("Rua  das   Flores", "100 ", "Alegre"));
        let b = cache_key(&record("Rua das Flores", "100", "Alegre"));
        assert_eq!(a, b);
    }

    #[test]
    fn identical_addresses_share_a_key_across_records() {
        let mut first = record("Rua A", "1", "Macuco");
        first.identificacao = "1".to_string();
        let mut second = record("Rua A", "1", "Macuco");
        second.identificacao = "2".to_string();
        assert_eq!(cache_key(&first), cache_key(&second));
    }

    #[test]
    fn query_carries_full_municipality_context() {
        let query = lookup_query(&record("Rua A", "1", "Macuco"));
        assert_eq!(query, "Rua A, 1, Macuco, Timóteo, MG, Brasil");
    }
}
