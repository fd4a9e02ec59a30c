//! MCP Tools Implementation
//!
//! The three weather lookup tools. Each handler validates its parameters,
//! delegates to the shared [`WeatherService`], and converts every lookup
//! failure into report text: a tool call never surfaces a weather failure
//! as a protocol fault, callers distinguish success from failure by
//! content.

use crate::mcp::protocol::*;
use crate::mcp::server::{HandlerOutput, ToolHandler};
use crate::service::{MAX_FORECAST_DAYS, MIN_FORECAST_DAYS, WeatherService};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Current conditions by city name
pub struct GetWeatherHandler {
    service: Arc<WeatherService>,
}

/// Multi-day forecast by city name
pub struct GetForecastHandler {
    service: Arc<WeatherService>,
}

/// Current conditions by raw coordinates
pub struct GetWeatherByCoordinatesHandler {
    service: Arc<WeatherService>,
}

/// A lookup failure rendered as an error report envelope.
fn failure_envelope(text: String) -> Result<HandlerOutput> {
    let envelope = CallToolResult {
        content: vec![ToolContent::Text { text }],
        is_error: Some(true),
    };
    Ok(HandlerOutput::Envelope(serde_json::to_value(envelope)?))
}

fn required_str<'a>(
    args: &'a HashMap<String, serde_json::Value>,
    name: &str,
) -> Result<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing required parameter: {name}"))
}

impl GetWeatherHandler {
    /// Create a new get_weather handler
    #[inline]
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }

    /// Create the get_weather tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "get_weather".to_string(),
            description: Some("Get current weather conditions for a city".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name, e.g. 'London' or 'San Francisco'"
                    }
                },
                "required": ["city"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for GetWeatherHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<HandlerOutput> {
        let args = params.arguments.unwrap_or_default();
        let city = required_str(&args, "city")?;

        debug!(city, "get_weather invoked");

        match self.service.current_by_city(city).await {
            Ok(report) => Ok(HandlerOutput::Text(report)),
            Err(e) => {
                error!("get_weather failed for '{}': {}", city, e);
                failure_envelope(format!("Error retrieving weather: {e}"))
            }
        }
    }
}

impl GetForecastHandler {
    /// Create a new get_forecast handler
    #[inline]
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }

    /// Create the get_forecast tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "get_forecast".to_string(),
            description: Some("Get a multi-day weather forecast for a city".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name, e.g. 'London' or 'San Francisco'"
                    },
                    "days": {
                        "type": "integer",
                        "description": "Number of forecast days (1-14, default: 7)",
                        "minimum": 1,
                        "maximum": 14
                    }
                },
                "required": ["city"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for GetForecastHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<HandlerOutput> {
        let args = params.arguments.unwrap_or_default();
        let city = required_str(&args, "city")?;

        let days = match args.get("days") {
            None => i64::from(crate::service::DEFAULT_FORECAST_DAYS),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| anyhow!("Invalid parameter: days must be an integer"))?,
        };

        debug!(city, days, "get_forecast invoked");

        // Range check before any upstream call.
        if days < i64::from(MIN_FORECAST_DAYS) || days > i64::from(MAX_FORECAST_DAYS) {
            return failure_envelope(format!(
                "Error retrieving forecast: days must be between {MIN_FORECAST_DAYS} and {MAX_FORECAST_DAYS}, got {days}"
            ));
        }
        let days = u8::try_from(days).map_err(|_| anyhow!("Invalid parameter: days"))?;

        match self.service.forecast_by_city(city, days).await {
            Ok(report) => Ok(HandlerOutput::Text(report)),
            Err(e) => {
                error!("get_forecast failed for '{}': {}", city, e);
                failure_envelope(format!("Error retrieving forecast: {e}"))
            }
        }
    }
}

impl GetWeatherByCoordinatesHandler {
    /// Create a new get_weather_by_coordinates handler
    #[inline]
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }

    /// Create the get_weather_by_coordinates tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "get_weather_by_coordinates".to_string(),
            description: Some(
                "Get current weather conditions for a latitude/longitude pair".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "Latitude coordinate (-90 to 90)"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "Longitude coordinate (-180 to 180)"
                    }
                },
                "required": ["latitude", "longitude"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for GetWeatherByCoordinatesHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<HandlerOutput> {
        let args = params.arguments.unwrap_or_default();

        let latitude = args
            .get("latitude")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| anyhow!("Missing required parameter: latitude"))?;
        let longitude = args
            .get("longitude")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| anyhow!("Missing required parameter: longitude"))?;

        debug!(latitude, longitude, "get_weather_by_coordinates invoked");

        match self.service.current_by_coordinates(latitude, longitude).await {
            Ok(report) => Ok(HandlerOutput::Text(report)),
            Err(e) => {
                error!(
                    "get_weather_by_coordinates failed for ({}, {}): {}",
                    latitude, longitude, e
                );
                failure_envelope(format!("Error retrieving weather: {e}"))
            }
        }
    }
}
