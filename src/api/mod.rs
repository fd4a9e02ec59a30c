//! Open-Meteo API Clients
//!
//! HTTP collaborators for the two upstream services: the geocoding API that
//! resolves free-text place names and the forecast API that serves current
//! conditions and daily forecasts.

pub mod geocoding;
pub mod weather;


pub use geocoding::Location;
pub use weather::{CurrentConditions, DailyForecast};

use reqwest::Response;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::Config;

/// Failures raised by the upstream fetch collaborators.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {reason}")]
    Status {
        service: &'static str,
        status: u16,
        reason: String,
    },

    #[error("{service} returned a malformed response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("no matching location found for '{query}'")]
    LocationNotFound { query: String },
}

/// Client for the Open-Meteo geocoding and forecast APIs.
///
/// Endpoint URLs come from [`Config`] so tests can point the client at a
/// mock server.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    geocoding_url: Url,
    forecast_url: Url,
}

impl OpenMeteoClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_seconds))
            .user_agent(concat!("weather-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http,
            geocoding_url: config.api.geocoding_url.clone(),
            forecast_url: config.api.forecast_url.clone(),
        })
    }

    pub(crate) async fn get_json<T>(
        &self,
        service: &'static str,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport { service, source })?;

        let response = Self::check_status(service, response)?;

        response.json().await.map_err(|e| ApiError::Decode {
            service,
            message: e.to_string(),
        })
    }

    fn check_status(service: &'static str, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status {
                service,
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            })
        }
    }

    pub(crate) fn geocoding_url(&self) -> Url {
        self.geocoding_url.clone()
    }

    pub(crate) fn forecast_url(&self) -> Url {
        self.forecast_url.clone()
    }
}
