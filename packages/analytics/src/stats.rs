//! Single-pass aggregation of survey records into a [`SurveyStats`]
//! snapshot.
//!
//! The accumulation is a fold over an owned accumulator rather than
//! in-place mutation of a shared map, so repeated calls never observe
//! each other's state.

use larvascan_analytics_models::{ALL, SurveyStats};
use larvascan_survey_models::{Species, SurveyRecord};

use crate::reference;

/// Default label for positive records with an empty deposit description.
pub const LABEL_NO_DEPOSIT: &str = "Não Informado";
/// Default label for positive records with an empty deposit code.
pub const LABEL_NO_CODE: &str = "Sem Código";
/// Default label for positive records with an empty property type.
pub const LABEL_NO_PROPERTY_TYPE: &str = "Outros";
/// Default label for positive records with an empty agent or supervisor.
pub const LABEL_UNKNOWN: &str = "Desconhecido";

/// Computes the full indicator snapshot for a record collection.
///
/// `selected_neighborhood` picks the IIP denominator: the [`ALL`]
/// sentinel sums the whole reference table, any other value looks up
/// that single neighborhood (0 when absent, which degrades the rate to
/// 0 rather than failing). The denominator is a reference figure and
/// intentionally independent of how many records were inspected.
///
/// Pure and deterministic; an empty `records` slice yields an all-zero
/// snapshot with `infestation_rate == 0`.
#[must_use]
pub fn compute_stats(records: &[SurveyRecord], selected_neighborhood: &str) -> SurveyStats {
    let stats = records
        .iter()
        .fold(SurveyStats::default(), |acc, record| observe(acc, record));

    finish(stats, selected_neighborhood)
}

/// Folds one record into the accumulator.
fn observe(mut acc: SurveyStats, record: &SurveyRecord) -> SurveyStats {
    acc.total_records += 1;

    if record.is_species_positive(Species::Aegypti) {
        acc.positive_aegypti += 1;
    }
    if record.is_species_positive(Species::Albopictus) {
        acc.positive_albopictus += 1;
    }
    if record.is_species_positive(Species::Others) {
        acc.positive_outros += 1;
    }
    if record.is_positive {
        acc.total_positives += 1;
    }

    // Raw specimen totals over the whole set, not gated by positivity.
    acc.larva_aegypti_total += u64::from(record.larva_aegypti);
    acc.pupa_aegypti_total += u64::from(record.pupa_aegypti);
    acc.larva_albopictus_total += u64::from(record.larva_albopictus);
    acc.pupa_albopictus_total += u64::from(record.pupa_albopictus);
    acc.larva_outros_total += u64::from(record.larva_outros);
    acc.pupa_outros_total += u64::from(record.pupa_outros);

    if record.is_positive {
        tally(
            &mut acc.deposit_frequency,
            &record.deposito,
            LABEL_NO_DEPOSIT,
        );
        tally(
            &mut acc.codigo_depto_frequency,
            &record.codigo_deposito,
            LABEL_NO_CODE,
        );
        tally(
            &mut acc.property_type_frequency,
            &record.tipo_imovel,
            LABEL_NO_PROPERTY_TYPE,
        );
        tally(&mut acc.agent_performance, &record.agente, LABEL_UNKNOWN);
        tally(
            &mut acc.supervisor_performance,
            &record.supervisor,
            LABEL_UNKNOWN,
        );
    }

    acc
}

/// Resolves the reference denominator and derives the IIP.
#[allow(clippy::cast_precision_loss)]
fn finish(mut acc: SurveyStats, selected_neighborhood: &str) -> SurveyStats {
    acc.total_negatives = acc.total_records - acc.total_positives;

    acc.total_properties_in_area = if selected_neighborhood == ALL {
        reference::total_properties()
    } else {
        reference::properties_in(selected_neighborhood)
    };

    // IIP = positive buildings / reference building total * 100.
    if acc.total_properties_in_area > 0 {
        acc.infestation_rate =
            acc.total_positives as f64 / acc.total_properties_in_area as f64 * 100.0;
    } else {
        acc.infestation_rate = 0.0;
    }

    acc
}

/// Increments a frequency-table bucket, substituting `default_label`
/// when the source field is empty. Positive records are never dropped
/// from a table for lacking a label.
fn tally(
    table: &mut std::collections::BTreeMap<String, u64>,
    label: &str,
    default_label: &str,
) {
    let key = if label.is_empty() { default_label } else { label };
    *table.entry(key.to_string()).or_insert(0) += 1;
}
