//! Weather lookup against the Open-Meteo forecast API.
//!
//! Two request shapes against the same endpoint: an instantaneous snapshot
//! (`current=` field list) and a multi-day forecast (`daily=` field list,
//! one parallel array per field, index-aligned by day).

use serde::Deserialize;
use tracing::debug;

use super::{ApiError, OpenMeteoClient};

const SERVICE: &str = "weather API";

pub(crate) const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,\
precipitation,rain,weather_code,cloud_cover,wind_speed_10m,wind_direction_10m,wind_gusts_10m";

pub(crate) const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
precipitation_sum,precipitation_hours,wind_speed_10m_max,wind_gusts_10m_max,\
wind_direction_10m_dominant";

/// Instantaneous weather snapshot for one point.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub time: String,
    pub temperature_2m: f64,
    pub apparent_temperature: f64,
    pub relative_humidity_2m: f64,
    pub precipitation: f64,
    pub rain: f64,
    pub weather_code: u32,
    pub cloud_cover: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub wind_gusts_10m: f64,
}

/// Daily forecast series. Fields are parallel arrays, index-aligned by day,
/// in the chronological order the API returns them.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyForecast {
    pub time: Vec<String>,
    pub weather_code: Vec<u32>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub precipitation_sum: Vec<f64>,
    pub precipitation_hours: Vec<f64>,
    pub wind_speed_10m_max: Vec<f64>,
    pub wind_gusts_10m_max: Vec<f64>,
    pub wind_direction_10m_dominant: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyForecast,
}

impl OpenMeteoClient {
    /// Fetch the current-conditions snapshot for the given coordinates.
    #[inline]
    pub async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, ApiError> {
        debug!(latitude, longitude, "fetching current conditions");

        let response: CurrentResponse = self
            .get_json(
                SERVICE,
                self.forecast_url(),
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("current", CURRENT_FIELDS.to_string()),
                ],
            )
            .await?;

        Ok(response.current)
    }

    /// Fetch a daily forecast series covering `days` days.
    #[inline]
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<DailyForecast, ApiError> {
        debug!(latitude, longitude, days, "fetching forecast");

        let response: ForecastResponse = self
            .get_json(
                SERVICE,
                self.forecast_url(),
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("daily", DAILY_FIELDS.to_string()),
                    ("forecast_days", days.to_string()),
                ],
            )
            .await?;

        Ok(response.daily)
    }
}
