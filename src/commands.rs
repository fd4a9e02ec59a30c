//! CLI command implementations.

use anyhow::Context;
use console::style;
use std::sync::Arc;
use tracing::info;

use crate::Result;
use crate::config::Config;
use crate::mcp::McpServer;
use crate::mcp::resources::CurrentWeatherResource;
use crate::mcp::tools::{GetForecastHandler, GetWeatherByCoordinatesHandler, GetWeatherHandler};
use crate::service::WeatherService;

/// Start the MCP server on stdio with all weather tools and the
/// current-weather resource registered.
#[inline]
pub async fn serve_mcp() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let service = Arc::new(WeatherService::new(&config)?);

    let server = Arc::new(McpServer::new(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    )?);

    server
        .register_tool(
            GetWeatherHandler::tool_definition(),
            GetWeatherHandler::new(Arc::clone(&service)),
        )
        .await?;
    server
        .register_tool(
            GetForecastHandler::tool_definition(),
            GetForecastHandler::new(Arc::clone(&service)),
        )
        .await?;
    server
        .register_tool(
            GetWeatherByCoordinatesHandler::tool_definition(),
            GetWeatherByCoordinatesHandler::new(Arc::clone(&service)),
        )
        .await?;
    server
        .register_resource(
            CurrentWeatherResource::resource_definition(),
            CurrentWeatherResource::new(Arc::clone(&service)),
        )
        .await?;

    info!("Weather MCP server configured, serving on stdio");
    server.serve_stdio().await?;

    Ok(())
}

/// One-shot current-conditions lookup, printed to stdout.
#[inline]
pub async fn lookup_current(city: &str) -> Result<()> {
    let service = build_service()?;

    match service.current_by_city(city).await {
        Ok(report) => println!("{report}"),
        Err(e) => println!("{}", style(format!("Error retrieving weather: {e}")).red()),
    }

    Ok(())
}

/// One-shot forecast lookup, printed to stdout.
#[inline]
pub async fn lookup_forecast(city: &str, days: u8) -> Result<()> {
    let service = build_service()?;

    match service.forecast_by_city(city, days).await {
        Ok(report) => println!("{report}"),
        Err(e) => println!("{}", style(format!("Error retrieving forecast: {e}")).red()),
    }

    Ok(())
}

fn build_service() -> Result<WeatherService> {
    let config = Config::load().context("Failed to load configuration")?;
    Ok(WeatherService::new(&config)?)
}
