use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Weather API error: {0}")]
    Api(#[from] api::ApiError),

    #[error("Lookup error: {0}")]
    Service(#[from] service::ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod format;
pub mod mcp;
pub mod service;
