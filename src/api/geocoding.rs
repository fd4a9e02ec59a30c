//! Geocoding lookup against the Open-Meteo geocoding API.

use serde::Deserialize;
use tracing::debug;

use super::{ApiError, OpenMeteoClient};

const SERVICE: &str = "geocoding API";

/// A resolved place: coordinates plus display metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
}

impl Location {
    /// Human-readable label: name plus admin region and country when known.
    #[inline]
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        if let Some(admin1) = &self.admin1 {
            label.push_str(", ");
            label.push_str(admin1);
        }
        if let Some(country) = &self.country {
            label.push_str(", ");
            label.push_str(country);
        }
        label
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Location>,
}

impl OpenMeteoClient {
    /// Resolve a free-text place name to its single best match.
    ///
    /// Zero matches is a distinct [`ApiError::LocationNotFound`] failure, not
    /// an empty success.
    #[inline]
    pub async fn geocode(&self, query: &str) -> Result<Location, ApiError> {
        debug!(query, "resolving place name");

        let response: GeocodingResponse = self
            .get_json(
                SERVICE,
                self.geocoding_url(),
                &[
                    ("name", query.to_string()),
                    ("count", "1".to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::LocationNotFound {
                query: query.to_string(),
            })
    }
}
