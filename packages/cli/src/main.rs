#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tools for the LarvaScan surveillance pipeline.
//!
//! `stats` aggregates a lab export (or the persisted snapshot) into the
//! indicator snapshot, `ranking` lists neighborhoods by positive
//! findings, and `geocode` resolves positive records to map points
//! through the cached Nominatim lookup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use larvascan_analytics::{compute_stats, ranking};
use larvascan_analytics_models::{ALL, RecordFilter};
use larvascan_geocoder::GeocodeResolver;
use larvascan_geocoder::nominatim::NominatimClient;
use larvascan_storage::{GeocodeCache, JsonFileStore, KeyValueStore, snapshot};
use larvascan_survey_models::SurveyRecord;

#[derive(Parser)]
#[command(name = "larvascan", about = "Entomological surveillance analytics for Timóteo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the indicator snapshot (IIP, species counts, tables).
    Stats {
        /// Lab CSV export. Omit to reuse the last persisted snapshot.
        file: Option<PathBuf>,
        /// Neighborhood selector (also the IIP denominator).
        #[arg(long, default_value = ALL)]
        bairro: String,
        /// Inspection-cycle selector.
        #[arg(long, default_value = ALL)]
        ciclo: String,
        /// Activity-type selector.
        #[arg(long = "tipo-atividade", default_value = ALL)]
        tipo_atividade: String,
        /// Substring search over address and neighborhood.
        #[arg(long, default_value = "")]
        search: String,
        /// Also write the snapshot to a dated report file.
        #[arg(long)]
        export: bool,
    },
    /// Rank neighborhoods by positive findings.
    Ranking {
        /// Lab CSV export. Omit to reuse the last persisted snapshot.
        file: Option<PathBuf>,
    },
    /// Geocode positive records to map points.
    Geocode {
        /// Lab CSV export. Omit to reuse the last persisted snapshot.
        file: Option<PathBuf>,
        /// Write points to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Loads records from a CSV file (persisting the new snapshot) or from
/// the last persisted snapshot when no file is given.
///
/// A file that parses to zero records aborts the operation without
/// touching the persisted snapshot.
fn load_records(
    store: &dyn KeyValueStore,
    file: Option<&Path>,
) -> Result<Vec<SurveyRecord>, Box<dyn std::error::Error>> {
    match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let records = larvascan_ingest::parse_csv(&text);
            if records.is_empty() {
                return Err(format!(
                    "no records parsed from {}; keeping the previous snapshot",
                    path.display()
                )
                .into());
            }
            snapshot::save_records(store, &records)?;
            Ok(records)
        }
        None => Ok(snapshot::load_records(store)?),
    }
}

fn store_path() -> PathBuf {
    let dir = std::env::var("LARVASCAN_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    PathBuf::from(dir).join("larvascan.json")
}

fn dated_report_path() -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d");
    PathBuf::from(format!("LarvaScan_Timoteo_{date}.json"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&store_path())?);

    match cli.command {
        Command::Stats {
            file,
            bairro,
            ciclo,
            tipo_atividade,
            search,
            export,
        } => {
            let records = load_records(store.as_ref(), file.as_deref())?;
            let filter = RecordFilter {
                search,
                bairro,
                ciclo,
                tipo_atividade,
            };
            let filtered: Vec<SurveyRecord> = records
                .iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect();

            let stats = compute_stats(&filtered, &filter.bairro);
            let rendered = serde_json::to_string_pretty(&stats)?;
            println!("{rendered}");

            if export {
                let path = dated_report_path();
                std::fs::write(&path, &rendered)?;
                log::info!("Report written to {}", path.display());
            }
        }
        Command::Ranking { file } => {
            let records = load_records(store.as_ref(), file.as_deref())?;
            for (position, (bairro, count)) in
                ranking::neighborhood_ranking(&records).iter().enumerate()
            {
                println!("#{} {bairro}: {count}", position + 1);
            }

            let stats = compute_stats(&records, ALL);
            println!("\nMost frequent deposit types:");
            for (label, count) in ranking::top_n(&stats.deposit_frequency, 5) {
                println!("  {label}: {count}");
            }
            println!("\nMost frequent deposit codes:");
            for (label, count) in ranking::top_n(&stats.codigo_depto_frequency, 5) {
                println!("  {label}: {count}");
            }
        }
        Command::Geocode { file, output } => {
            let records = load_records(store.as_ref(), file.as_deref())?;

            let cache = Arc::new(GeocodeCache::open(Arc::clone(&store))?);
            let client = reqwest::Client::builder()
                .user_agent(concat!("larvascan/", env!("CARGO_PKG_VERSION")))
                .build()?;
            let resolver =
                GeocodeResolver::new(Arc::new(NominatimClient::new(client)), cache);

            let points = resolver.resolve(&records).await;
            log::info!(
                "Resolved {} of {} positive record(s)",
                points.len(),
                records.iter().filter(|r| r.is_positive).count()
            );

            let rendered = serde_json::to_string_pretty(&points)?;
            match output {
                Some(path) => std::fs::write(&path, rendered)?,
                None => println!("{rendered}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use larvascan_storage::MemoryStore;

    use super::*;

    #[test]
    fn empty_csv_ingestion_aborts_and_keeps_the_previous_snapshot() {
        let store = MemoryStore::new();
        let mut seeded = SurveyRecord {
            endereco: "Rua A".to_string(),
            larva_aegypti: 1,
            ..SurveyRecord::default()
        };
        seeded.seal();
        snapshot::save_records(&store, std::slice::from_ref(&seeded)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "Endereco;Bairro\n").unwrap();

        assert!(load_records(&store, Some(&path)).is_err());

        let kept = snapshot::load_records(&store).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].endereco, "Rua A");
    }

    #[test]
    fn parsed_csv_replaces_the_snapshot() {
        let store = MemoryStore::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "Endereco;LarvaAegypti\nRua B;2\n").unwrap();

        let records = load_records(&store, Some(&path)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(snapshot::load_records(&store).unwrap(), records);
    }
}
