//! Ranking and listing helpers over record collections and frequency
//! tables, used by the summary endpoints and report export.

use std::collections::BTreeMap;

use larvascan_analytics_models::ALL;
use larvascan_survey_models::SurveyRecord;

/// Positive-finding counts per neighborhood, most affected first.
///
/// Ties keep the lexicographic neighborhood order stable.
#[must_use]
pub fn neighborhood_ranking(records: &[SurveyRecord]) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_positive) {
        *counts.entry(record.bairro.as_str()).or_insert(0) += 1;
    }

    let mut ranking: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranking
}

/// The `n` largest buckets of a frequency table, descending by count.
#[must_use]
pub fn top_n(table: &BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = table
        .iter()
        .map(|(label, count)| (label.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

/// Sorted distinct values of one record field, with the [`ALL`]
/// sentinel included, for populating filter selectors.
#[must_use]
pub fn selector_values<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut values: Vec<String> = values.into_iter().map(str::to_string).collect();
    values.push(ALL.to_string());
    values.sort();
    values.dedup();
    values
}
