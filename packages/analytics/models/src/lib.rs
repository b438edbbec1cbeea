#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregated surveillance indicator types.
//!
//! Defines the [`SurveyStats`] snapshot computed by `larvascan_analytics`
//! and the [`RecordFilter`] parameters used to narrow a record set before
//! aggregation. Serde renames keep the JSON shape identical to the
//! dashboard payloads the municipal frontend already consumes.

use std::collections::BTreeMap;

use larvascan_survey_models::SurveyRecord;
use serde::{Deserialize, Serialize};

/// Sentinel selector value meaning "no filtering on this dimension".
pub const ALL: &str = "Todos";

/// A derived, recomputed-on-demand snapshot over a record collection.
///
/// Purely derived data: never mutated in place, recomputed whenever the
/// input record set or the neighborhood selector changes.
///
/// The frequency tables count positive records only. Their value sums
/// need not equal `total_positives`: a positive record with empty label
/// fields is counted under a default label in every table rather than
/// dropped, so one record can contribute to all five tables at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStats {
    /// Total records aggregated.
    pub total_records: u64,
    /// Records positive for Aedes aegypti.
    pub positive_aegypti: u64,
    /// Records positive for Aedes albopictus.
    pub positive_albopictus: u64,
    /// Records positive for other species.
    pub positive_outros: u64,
    /// Records classified positive overall.
    pub total_positives: u64,
    /// Records classified negative overall.
    pub total_negatives: u64,
    /// Raw aegypti larva total over the whole (filtered) record set,
    /// not gated by positivity.
    pub larva_aegypti_total: u64,
    /// Raw aegypti pupa total.
    pub pupa_aegypti_total: u64,
    /// Raw albopictus larva total.
    pub larva_albopictus_total: u64,
    /// Raw albopictus pupa total.
    pub pupa_albopictus_total: u64,
    /// Raw other-species larva total.
    pub larva_outros_total: u64,
    /// Raw other-species pupa total.
    pub pupa_outros_total: u64,
    /// Building Infestation Index (IIP), percent. Zero when the
    /// reference denominator is zero or unknown.
    pub infestation_rate: f64,
    /// Reference building population used as the IIP denominator.
    pub total_properties_in_area: u64,
    /// Positive findings per deposit description.
    pub deposit_frequency: BTreeMap<String, u64>,
    /// Positive findings per deposit type code.
    pub codigo_depto_frequency: BTreeMap<String, u64>,
    /// Positive findings per property type.
    pub property_type_frequency: BTreeMap<String, u64>,
    /// Positive findings per field agent.
    pub agent_performance: BTreeMap<String, u64>,
    /// Positive findings per supervisor.
    pub supervisor_performance: BTreeMap<String, u64>,
}

/// Filter parameters applied to a record collection before aggregation.
///
/// Selector fields use the [`ALL`] sentinel to disable that dimension;
/// the search term matches case-insensitively against street address
/// and neighborhood.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    /// Case-insensitive substring searched in `Endereco` and `Bairro`.
    #[serde(default)]
    pub search: String,
    /// Exact neighborhood selector, or [`ALL`].
    #[serde(default = "all_sentinel")]
    pub bairro: String,
    /// Exact inspection-cycle selector, or [`ALL`].
    #[serde(default = "all_sentinel")]
    pub ciclo: String,
    /// Exact activity-type selector, or [`ALL`].
    #[serde(default = "all_sentinel")]
    pub tipo_atividade: String,
}

fn all_sentinel() -> String {
    ALL.to_string()
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            bairro: all_sentinel(),
            ciclo: all_sentinel(),
            tipo_atividade: all_sentinel(),
        }
    }
}

impl RecordFilter {
    /// Whether a record passes every enabled filter dimension.
    #[must_use]
    pub fn matches(&self, record: &SurveyRecord) -> bool {
        let search = self.search.trim().to_lowercase();
        let matches_search = search.is_empty()
            || record.endereco.to_lowercase().contains(&search)
            || record.bairro.to_lowercase().contains(&search);

        let matches_bairro = self.bairro == ALL || record.bairro == self.bairro;
        let matches_ciclo = self.ciclo == ALL || record.ciclo == self.ciclo;
        let matches_tipo =
            self.tipo_atividade == ALL || record.tipo_atividade == self.tipo_atividade;

        matches_search && matches_bairro && matches_ciclo && matches_tipo
    }
}
