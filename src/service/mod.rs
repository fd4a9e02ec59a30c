//! Weather Lookup Service
//!
//! Dispatch core shared by the MCP handlers and the CLI commands. City-based
//! lookups consult the report cache first and only reach the upstream APIs on
//! a miss; coordinate-based lookups are always live fetches.

#[cfg(test)]
mod tests;

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{ApiError, OpenMeteoClient};
use crate::cache::{self, Namespace, ReportCache};
use crate::config::Config;
use crate::format;

pub const DEFAULT_FORECAST_DAYS: u8 = 7;
pub const MIN_FORECAST_DAYS: u8 = 1;
pub const MAX_FORECAST_DAYS: u8 = 14;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("city name must not be empty")]
    EmptyCity,

    #[error("latitude must be between -90 and 90, got {0}")]
    InvalidLatitude(f64),

    #[error("longitude must be between -180 and 180, got {0}")]
    InvalidLongitude(f64),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Orchestrates geocoding, weather fetches, formatting, and the report cache.
///
/// Constructed once at startup; handlers share it behind an `Arc`.
#[derive(Debug)]
pub struct WeatherService {
    client: OpenMeteoClient,
    cache: ReportCache,
}

impl WeatherService {
    #[inline]
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self {
            client: OpenMeteoClient::new(config)?,
            cache: ReportCache::new(),
        })
    }

    /// Current conditions for a city, cached for the expiry window.
    #[inline]
    pub async fn current_by_city(&self, city: &str) -> Result<String, ServiceError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ServiceError::EmptyCity);
        }

        let key = cache::city_key(city);
        if let Some(report) = self.cache.get(Namespace::Current, &key).await {
            debug!(city, "current conditions served from cache");
            return Ok(report);
        }

        let location = self.client.geocode(city).await?;
        let current = self
            .client
            .current(location.latitude, location.longitude)
            .await?;

        let report = format::current_report(&location.label(), &current, Local::now());
        self.cache.set(Namespace::Current, &key, report.clone()).await;

        info!(city, "current conditions fetched");
        Ok(report)
    }

    /// Multi-day forecast for a city, cached per (city, day count).
    ///
    /// `days` is validated by the callers' parameter contracts
    /// ([`MIN_FORECAST_DAYS`]..=[`MAX_FORECAST_DAYS`]).
    #[inline]
    pub async fn forecast_by_city(&self, city: &str, days: u8) -> Result<String, ServiceError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ServiceError::EmptyCity);
        }

        let key = cache::forecast_key(city, days);
        if let Some(report) = self.cache.get(Namespace::Forecast, &key).await {
            debug!(city, days, "forecast served from cache");
            return Ok(report);
        }

        let location = self.client.geocode(city).await?;
        let forecast = self
            .client
            .forecast(location.latitude, location.longitude, days)
            .await?;

        let report = format::forecast_report(&location.label(), &forecast, Local::now());
        self.cache.set(Namespace::Forecast, &key, report.clone()).await;

        info!(city, days, "forecast fetched");
        Ok(report)
    }

    /// Current conditions for raw coordinates. Never cached: there is no
    /// stable string key for floating-point coordinates, so every call is a
    /// live fetch.
    #[inline]
    pub async fn current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, ServiceError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ServiceError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ServiceError::InvalidLongitude(longitude));
        }

        let current = self.client.current(latitude, longitude).await?;
        let label = format::coordinate_label(latitude, longitude);

        info!(latitude, longitude, "current conditions fetched by coordinates");
        Ok(format::current_report(&label, &current, Local::now()))
    }
}
