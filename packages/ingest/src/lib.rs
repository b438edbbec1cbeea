#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion of raw laboratory export rows into [`SurveyRecord`]s.
//!
//! Columns are mapped by exact header-name match; the six specimen
//! count columns coerce to integers (0 on any parse failure), every
//! other column coerces to a string ("" when absent). Positivity is
//! derived once here, at ingestion. Data errors are never raised —
//! malformed cells default rather than fail, matching how the field
//! sheets actually arrive.

use larvascan_survey_models::SurveyRecord;

/// Field delimiter of the municipal laboratory CSV export.
const DELIMITER: char = ';';

/// Parses a semicolon-delimited CSV export into sealed records.
///
/// The first line is the header row (a UTF-8 BOM is stripped); fewer
/// than two lines yields an empty collection. Unknown columns are
/// ignored so newer lab exports with extra columns still load.
#[must_use]
pub fn parse_csv(text: &str) -> Vec<SurveyRecord> {
    let mut lines = text.trim().lines();

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line
        .trim_start_matches('\u{feff}')
        .split(DELIMITER)
        .map(str::trim)
        .collect();

    let records: Vec<SurveyRecord> = lines
        .map(|line| {
            let values: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
            record_from_row(&headers, &values)
        })
        .collect();

    log::info!("Parsed {} record(s) from CSV export", records.len());
    records
}

fn record_from_row(headers: &[&str], values: &[&str]) -> SurveyRecord {
    let mut record = SurveyRecord::default();
    for (i, header) in headers.iter().enumerate() {
        let value = values.get(i).copied().unwrap_or("");
        assign(&mut record, header, value);
    }
    record.seal();
    record
}

/// Integer coercion for count columns: integer parse first, then a
/// float fallback for spreadsheet cells like "3.0", else 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(value: &str) -> u32 {
    if let Ok(n) = value.parse::<u32>() {
        return n;
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map_or(0, |n| n as u32)
}

#[allow(clippy::too_many_lines)]
fn assign(record: &mut SurveyRecord, header: &str, value: &str) {
    match header {
        "Identificação" => record.identificacao = value.to_string(),
        "DataCadastro" => record.data_cadastro = value.to_string(),
        "Laboratorista" => record.laboratorista = value.to_string(),
        "Tipo_At" => record.tipo_atividade = value.to_string(),
        "DataColeta" => record.data_coleta = value.to_string(),
        "Ciclo" => record.ciclo = value.to_string(),
        "Semana" => record.semana = value.to_string(),
        "Supervisor" => record.supervisor = value.to_string(),
        "Agente" => record.agente = value.to_string(),
        "Quarteirao" => record.quarteirao = value.to_string(),
        "Endereco" => record.endereco = value.to_string(),
        "Numero" => record.numero = value.to_string(),
        "Complemento" => record.complemento = value.to_string(),
        "Setor" => record.setor = value.to_string(),
        "Bairro" => record.bairro = value.to_string(),
        "TipoImovel" => record.tipo_imovel = value.to_string(),
        "CodigoDepto" => record.codigo_deposito = value.to_string(),
        "Deposito" => record.deposito = value.to_string(),
        "LarvaAegypti" => record.larva_aegypti = parse_count(value),
        "PupaAegypti" => record.pupa_aegypti = parse_count(value),
        "LarvaAlbopictus" => record.larva_albopictus = parse_count(value),
        "PupaAlbopictus" => record.pupa_albopictus = parse_count(value),
        "LarvaOutros" => record.larva_outros = parse_count(value),
        "PupaOutros" => record.pupa_outros = parse_count(value),
        "Classif_LarvaAegypti" => record.classif_larva_aegypti = value.to_string(),
        "Classif_PupaAegypti" => record.classif_pupa_aegypti = value.to_string(),
        "Classif_LarvaAlbopictus" => record.classif_larva_albopictus = value.to_string(),
        "Classif_PupaAlbopictus" => record.classif_pupa_albopictus = value.to_string(),
        "Classif_LarvaOutros" => record.classif_larva_outros = value.to_string(),
        "Classif_PupaOutros" => record.classif_pupa_outros = value.to_string(),
        _ => {}
    }
}
