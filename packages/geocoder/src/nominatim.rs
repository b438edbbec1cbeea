//! Nominatim / OpenStreetMap geocoder client.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum
//! for the public instance. The caller is responsible for throttling
//! (see [`crate::resolver::LOOKUP_DELAY`]).
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;
use larvascan_survey_models::Coordinates;

use crate::{AddressLookup, GeocodeError};

/// Default public Nominatim search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// HTTP client for the Nominatim free-form search endpoint.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Creates a client against the public Nominatim instance.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom Nominatim instance.
    #[must_use]
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AddressLookup for NominatimClient {
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("format", "json"), ("q", query), ("limit", "1")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim JSON response, taking the first candidate.
fn parse_response(body: &serde_json::Value) -> Result<Option<Coordinates>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let longitude = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(Some(Coordinates {
        latitude,
        longitude,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "-19.5833",
            "lon": "-42.6444",
            "display_name": "Rua das Flores, Alegre, Timóteo, MG, Brasil"
        }]);
        let coords = parse_response(&body).unwrap().unwrap();
        assert!((coords.latitude - -19.5833).abs() < 1e-4);
        assert!((coords.longitude - -42.6444).abs() < 1e-4);
    }

    #[test]
    fn parses_empty_result_as_no_match() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array_response() {
        let body = serde_json::json!({"error": "unavailable"});
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_coordinates() {
        let body = serde_json::json!([{"lat": "not-a-number", "lon": "-42.6444"}]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
