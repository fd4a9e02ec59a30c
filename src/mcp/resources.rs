//! MCP Resources Implementation
//!
//! The `currentweather://{city}` templated resource. Reads resolve the city
//! through the same service path as the `get_weather` tool; the server wraps
//! the result in a `contents` envelope keyed by the requested URI.

use crate::mcp::protocol::*;
use crate::mcp::server::{HandlerOutput, ResourceHandler};
use crate::service::WeatherService;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, error};

/// URI template for the current-weather resource
pub const CURRENT_WEATHER_TEMPLATE: &str = "currentweather://{city}";

/// Current conditions exposed as a templated resource
pub struct CurrentWeatherResource {
    service: Arc<WeatherService>,
}

impl CurrentWeatherResource {
    /// Create a new current-weather resource handler
    #[inline]
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }

    /// Create the resource definition advertised in `resources/list`
    #[inline]
    pub fn resource_definition() -> Resource {
        Resource {
            uri: CURRENT_WEATHER_TEMPLATE.to_string(),
            name: "current-weather".to_string(),
            description: Some("Current weather conditions for a city".to_string()),
            mime_type: Some("text/plain".to_string()),
        }
    }
}

#[async_trait]
impl ResourceHandler for CurrentWeatherResource {
    #[inline]
    async fn handle(&self, uri: &str) -> Result<HandlerOutput> {
        let city =
            city_from_uri(uri).ok_or_else(|| anyhow!("Unsupported resource URI: {uri}"))?;

        debug!(uri, city, "current-weather resource read");

        match self.service.current_by_city(&city).await {
            Ok(report) => Ok(HandlerOutput::Text(report)),
            Err(e) => {
                error!("current-weather resource failed for '{}': {}", city, e);
                Ok(HandlerOutput::Text(format!("Error retrieving weather: {e}")))
            }
        }
    }
}

/// Extract and percent-decode the `{city}` segment of a current-weather URI.
#[inline]
pub fn city_from_uri(uri: &str) -> Option<String> {
    let city = uri.strip_prefix("currentweather://")?;
    if city.is_empty() {
        return None;
    }
    Some(
        urlencoding::decode(city)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| city.to_string()),
    )
}

/// Whether a concrete URI matches a registered URI template. Templates hold
/// at most one `{variable}` segment; a template without one must match
/// exactly.
#[inline]
pub fn template_matches(template: &str, uri: &str) -> bool {
    let Some((prefix, rest)) = template.split_once('{') else {
        return template == uri;
    };
    let Some((_, suffix)) = rest.split_once('}') else {
        return template == uri;
    };

    uri.len() > prefix.len() + suffix.len() && uri.starts_with(prefix) && uri.ends_with(suffix)
}
