#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Entomological survey record types and positivity classification.
//!
//! This crate defines the canonical record shape produced by field
//! inspections (one record per visited deposit) and the classification
//! rule that decides whether a record counts as a positive finding.
//! All other crates in the workspace consume these types.
//!
//! Serde field renames follow the column headers of the municipal
//! laboratory export so that persisted snapshots and freshly parsed
//! spreadsheets share one wire format.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The exact classification value the laboratory uses to mark a
/// positive specimen analysis.
pub const POSITIVE_FLAG: &str = "Positivo";

/// Mosquito species groups distinguished by the laboratory.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum Species {
    /// Aedes aegypti, the primary dengue/zika/chikungunya vector.
    Aegypti,
    /// Aedes albopictus, a secondary vector.
    Albopictus,
    /// All other captured species, reported in aggregate.
    Others,
}

/// One field-inspection event: a visited deposit, the specimens
/// collected from it, and the laboratory's classification of each
/// specimen group.
///
/// `is_positive` is derived once at ingestion via [`Self::classify`]
/// and never re-derived afterwards; records are immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    /// Unique record identifier assigned by the laboratory system.
    #[serde(rename = "Identificação", default)]
    pub identificacao: String,
    /// Date the record was registered.
    #[serde(rename = "DataCadastro", default)]
    pub data_cadastro: String,
    /// Laboratory analyst name.
    #[serde(rename = "Laboratorista", default)]
    pub laboratorista: String,
    /// Activity type of the inspection round (e.g. "LI", "PE").
    #[serde(rename = "Tipo_At", default)]
    pub tipo_atividade: String,
    /// Date the specimens were collected.
    #[serde(rename = "DataColeta", default)]
    pub data_coleta: String,
    /// Named inspection cycle within the surveillance program.
    #[serde(rename = "Ciclo", default)]
    pub ciclo: String,
    /// Epidemiological week.
    #[serde(rename = "Semana", default)]
    pub semana: String,
    /// Supervising agent.
    #[serde(rename = "Supervisor", default)]
    pub supervisor: String,
    /// Field agent who performed the inspection.
    #[serde(rename = "Agente", default)]
    pub agente: String,
    /// City block identifier.
    #[serde(rename = "Quarteirao", default)]
    pub quarteirao: String,
    /// Street name.
    #[serde(rename = "Endereco", default)]
    pub endereco: String,
    /// Street number.
    #[serde(rename = "Numero", default)]
    pub numero: String,
    /// Address complement.
    #[serde(rename = "Complemento", default)]
    pub complemento: String,
    /// Surveillance sector.
    #[serde(rename = "Setor", default)]
    pub setor: String,
    /// Neighborhood name.
    #[serde(rename = "Bairro", default)]
    pub bairro: String,
    /// Property type (residential, commercial, vacant lot, ...).
    #[serde(rename = "TipoImovel", default)]
    pub tipo_imovel: String,
    /// Deposit type code from the national surveillance taxonomy.
    #[serde(rename = "CodigoDepto", default)]
    pub codigo_deposito: String,
    /// Free-text deposit description (water tank, tire, ...).
    #[serde(rename = "Deposito", default)]
    pub deposito: String,

    /// Aedes aegypti larvae counted.
    #[serde(rename = "LarvaAegypti", default)]
    pub larva_aegypti: u32,
    /// Aedes aegypti pupae counted.
    #[serde(rename = "PupaAegypti", default)]
    pub pupa_aegypti: u32,
    /// Aedes albopictus larvae counted.
    #[serde(rename = "LarvaAlbopictus", default)]
    pub larva_albopictus: u32,
    /// Aedes albopictus pupae counted.
    #[serde(rename = "PupaAlbopictus", default)]
    pub pupa_albopictus: u32,
    /// Other-species larvae counted.
    #[serde(rename = "LarvaOutros", default)]
    pub larva_outros: u32,
    /// Other-species pupae counted.
    #[serde(rename = "PupaOutros", default)]
    pub pupa_outros: u32,

    /// Laboratory classification of the aegypti larva sample.
    #[serde(rename = "Classif_LarvaAegypti", default)]
    pub classif_larva_aegypti: String,
    /// Laboratory classification of the aegypti pupa sample.
    #[serde(rename = "Classif_PupaAegypti", default)]
    pub classif_pupa_aegypti: String,
    /// Laboratory classification of the albopictus larva sample.
    #[serde(rename = "Classif_LarvaAlbopictus", default)]
    pub classif_larva_albopictus: String,
    /// Laboratory classification of the albopictus pupa sample.
    #[serde(rename = "Classif_PupaAlbopictus", default)]
    pub classif_pupa_albopictus: String,
    /// Laboratory classification of the other-species larva sample.
    #[serde(rename = "Classif_LarvaOutros", default)]
    pub classif_larva_outros: String,
    /// Laboratory classification of the other-species pupa sample.
    #[serde(rename = "Classif_PupaOutros", default)]
    pub classif_pupa_outros: String,

    /// Derived positivity, computed once at ingestion.
    #[serde(rename = "isPositive", default)]
    pub is_positive: bool,
}

impl SurveyRecord {
    /// Returns the `(larvae, pupae)` counts for one species group.
    #[must_use]
    pub const fn species_counts(&self, species: Species) -> (u32, u32) {
        match species {
            Species::Aegypti => (self.larva_aegypti, self.pupa_aegypti),
            Species::Albopictus => (self.larva_albopictus, self.pupa_albopictus),
            Species::Others => (self.larva_outros, self.pupa_outros),
        }
    }

    /// Returns the `(larva, pupa)` classification flags for one
    /// species group.
    #[must_use]
    pub fn species_flags(&self, species: Species) -> (&str, &str) {
        match species {
            Species::Aegypti => (&self.classif_larva_aegypti, &self.classif_pupa_aegypti),
            Species::Albopictus => (
                &self.classif_larva_albopictus,
                &self.classif_pupa_albopictus,
            ),
            Species::Others => (&self.classif_larva_outros, &self.classif_pupa_outros),
        }
    }

    /// Total specimens (larvae + pupae) across all species groups,
    /// saturating instead of overflowing on absurd count values.
    #[must_use]
    pub const fn total_specimens(&self) -> u32 {
        self.larva_aegypti
            .saturating_add(self.pupa_aegypti)
            .saturating_add(self.larva_albopictus)
            .saturating_add(self.pupa_albopictus)
            .saturating_add(self.larva_outros)
            .saturating_add(self.pupa_outros)
    }

    /// Whether one species group is positive: either of its two
    /// classification flags equals [`POSITIVE_FLAG`], or its two counts
    /// sum above zero. Both signals are kept even though they can
    /// disagree (a flagged sample with zero counts, or counted
    /// specimens the lab marked negative); downstream indicators
    /// depend on this inclusive OR.
    #[must_use]
    pub fn is_species_positive(&self, species: Species) -> bool {
        let (larva_flag, pupa_flag) = self.species_flags(species);
        let (larvae, pupae) = self.species_counts(species);
        larva_flag == POSITIVE_FLAG || pupa_flag == POSITIVE_FLAG || larvae > 0 || pupae > 0
    }

    /// Record-level positivity: any classification flag equals
    /// [`POSITIVE_FLAG`], or the six counts sum above zero.
    ///
    /// Missing fields never fail the computation: an absent count is
    /// zero and an absent flag is a non-match, so a record with empty
    /// metadata and no findings classifies as negative.
    #[must_use]
    pub fn classify(&self) -> bool {
        let flagged = [
            &self.classif_larva_aegypti,
            &self.classif_pupa_aegypti,
            &self.classif_larva_albopictus,
            &self.classif_pupa_albopictus,
            &self.classif_larva_outros,
            &self.classif_pupa_outros,
        ]
        .iter()
        .any(|flag| flag.as_str() == POSITIVE_FLAG);

        flagged || self.total_specimens() > 0
    }

    /// Derives and stores `is_positive`. Called once at ingestion.
    pub fn seal(&mut self) {
        self.is_positive = self.classify();
    }
}

/// A WGS84 coordinate pair.
///
/// Serialized as `{"lat": .., "lng": ..}` to stay compatible with the
/// persisted geocode cache format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude.
    #[serde(rename = "lng")]
    pub longitude: f64,
}

/// A positive survey record together with its resolved map position.
///
/// Produced only for records that are positive and successfully
/// geocoded; never persisted (the geocode cache is the durable state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPoint {
    /// The source record.
    #[serde(flatten)]
    pub record: SurveyRecord,
    /// Resolved coordinates.
    #[serde(flatten)]
    pub coordinates: Coordinates,
}
