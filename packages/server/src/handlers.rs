//! HTTP handler functions for the LarvaScan API.

use actix_web::{HttpResponse, web};
use larvascan_analytics::{compute_stats, ranking};
use larvascan_analytics_models::RecordFilter;
use larvascan_storage::snapshot;
use larvascan_survey_models::SurveyRecord;
use serde::Serialize;

use crate::AppState;

/// Service health payload.
#[derive(Serialize)]
pub struct ApiHealth {
    /// Always `true` when the service answers.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
}

/// Result of a record upload.
#[derive(Serialize)]
pub struct ApiUploadResult {
    /// Records imported from the upload.
    pub imported: usize,
    /// How many of them classified positive.
    pub positives: usize,
}

/// Filter selector values for the frontend dropdowns.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSelectors {
    /// Distinct neighborhoods.
    pub bairros: Vec<String>,
    /// Distinct inspection cycles.
    pub ciclos: Vec<String>,
    /// Distinct activity types.
    pub tipos_atividade: Vec<String>,
}

fn filtered_records(state: &AppState, filter: &RecordFilter) -> Vec<SurveyRecord> {
    state
        .records
        .read()
        .map(|records| {
            records
                .iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/stats`
///
/// Computes the indicator snapshot over the filtered record set. The
/// `bairro` filter doubles as the IIP denominator selector.
pub async fn stats(state: web::Data<AppState>, filter: web::Query<RecordFilter>) -> HttpResponse {
    let records = filtered_records(&state, &filter);
    HttpResponse::Ok().json(compute_stats(&records, &filter.bairro))
}

/// `GET /api/ranking`
///
/// Positive-finding counts per neighborhood, most affected first.
pub async fn ranking(state: web::Data<AppState>, filter: web::Query<RecordFilter>) -> HttpResponse {
    let records = filtered_records(&state, &filter);
    HttpResponse::Ok().json(ranking::neighborhood_ranking(&records))
}

/// `GET /api/selectors`
pub async fn selectors(state: web::Data<AppState>) -> HttpResponse {
    let records = state
        .records
        .read()
        .map(|r| r.clone())
        .unwrap_or_default();
    HttpResponse::Ok().json(ApiSelectors {
        bairros: ranking::selector_values(records.iter().map(|r| r.bairro.as_str())),
        ciclos: ranking::selector_values(records.iter().map(|r| r.ciclo.as_str())),
        tipos_atividade: ranking::selector_values(
            records.iter().map(|r| r.tipo_atividade.as_str()),
        ),
    })
}

/// `GET /api/points`
///
/// Geocodes the filtered positive records. Sequential and throttled, so
/// a cold cache can take a while; cached addresses answer immediately.
pub async fn points(state: web::Data<AppState>, filter: web::Query<RecordFilter>) -> HttpResponse {
    let records = filtered_records(&state, &filter);
    let points = state.resolver.resolve(&records).await;
    HttpResponse::Ok().json(points)
}

/// `GET /api/records`
pub async fn records(state: web::Data<AppState>) -> HttpResponse {
    let records = state
        .records
        .read()
        .map(|r| r.clone())
        .unwrap_or_default();
    HttpResponse::Ok().json(records)
}

/// `POST /api/records`
///
/// Replaces the record collection with a parsed CSV body and persists
/// the new snapshot. Any geocoding pass over the old collection is
/// superseded.
pub async fn upload_records(state: web::Data<AppState>, body: String) -> HttpResponse {
    let records = larvascan_ingest::parse_csv(&body);
    if records.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "no records found in upload"
        }));
    }

    if let Err(e) = snapshot::save_records(state.store.as_ref(), &records) {
        // The in-memory data is still replaced; only durability is lost.
        log::error!("Failed to persist record snapshot: {e}");
    }

    let imported = records.len();
    let positives = records.iter().filter(|r| r.is_positive).count();

    state.resolver.supersede();
    match state.records.write() {
        Ok(mut current) => *current = records,
        Err(_) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "record store lock poisoned"
            }));
        }
    }

    log::info!("Imported {imported} record(s), {positives} positive");
    HttpResponse::Ok().json(ApiUploadResult {
        imported,
        positives,
    })
}
