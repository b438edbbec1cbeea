#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding of positive survey findings for map display.
//!
//! Street addresses are resolved to coordinates through a rate-limited
//! external lookup ([`nominatim`]) behind the [`AddressLookup`] seam,
//! with a durable cache so an address is only ever looked up once. The
//! [`resolver`] drives a strictly sequential pass over positive
//! records, throttled to respect the public Nominatim rate limit.

pub mod address;
pub mod nominatim;
pub mod resolver;

use async_trait::async_trait;
use larvascan_survey_models::Coordinates;
use thiserror::Error;

pub use resolver::GeocodeResolver;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// The external address-lookup service, keyed by a free-text query.
///
/// Returns the best candidate's coordinate, or `None` when the service
/// has no match for the query. Implemented by
/// [`nominatim::NominatimClient`] in production and by scripted doubles
/// in tests.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolves a free-text address query to a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing
    /// fails. The resolver treats errors as per-record skips, never as
    /// fatal failures.
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}
