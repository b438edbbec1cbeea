#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the LarvaScan surveillance dashboard.
//!
//! Serves the indicator snapshot, neighborhood ranking, and geocoded
//! positive findings consumed by the map/report frontend, and accepts
//! CSV uploads that replace the in-memory record collection (persisted
//! as a snapshot so a restart resumes with the same data).

mod handlers;

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use larvascan_geocoder::GeocodeResolver;
use larvascan_geocoder::nominatim::NominatimClient;
use larvascan_storage::{GeocodeCache, JsonFileStore, KeyValueStore, snapshot};
use larvascan_survey_models::SurveyRecord;

/// Shared application state.
pub struct AppState {
    /// The current record collection. Replaced wholesale on upload,
    /// never mutated record-by-record.
    pub records: RwLock<Vec<SurveyRecord>>,
    /// Durable string-keyed store backing snapshots and the cache.
    pub store: Arc<dyn KeyValueStore>,
    /// Geocoding resolver shared by all point requests.
    pub resolver: Arc<GeocodeResolver>,
}

/// Resolves the store file path from `LARVASCAN_DATA_DIR` (default
/// `data/`).
#[must_use]
pub fn store_path() -> PathBuf {
    let dir = std::env::var("LARVASCAN_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    PathBuf::from(dir).join("larvascan.json")
}

/// Starts the LarvaScan API server.
///
/// Opens the persistent store, reloads the last record snapshot, wires
/// the geocoding resolver against the public Nominatim instance, and
/// serves the JSON API. This is a regular async function — the caller
/// provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the geocode cache
/// cannot be loaded, the HTTP client cannot be built, or the server
/// fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&store_path())?);

    let records = snapshot::load_records(store.as_ref())?;
    log::info!("Loaded {} record(s) from snapshot", records.len());

    let cache = Arc::new(GeocodeCache::open(Arc::clone(&store))?);
    log::info!("Geocode cache holds {} address(es)", cache.len());

    let client = reqwest::Client::builder()
        .user_agent(concat!("larvascan/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let resolver = Arc::new(GeocodeResolver::new(
        Arc::new(NominatimClient::new(client)),
        cache,
    ));

    let state = web::Data::new(AppState {
        records: RwLock::new(records),
        store,
        resolver,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/stats", web::get().to(handlers::stats))
                    .route("/ranking", web::get().to(handlers::ranking))
                    .route("/selectors", web::get().to(handlers::selectors))
                    .route("/points", web::get().to(handlers::points))
                    .route("/records", web::get().to(handlers::records))
                    .route("/records", web::post().to(handlers::upload_records)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
