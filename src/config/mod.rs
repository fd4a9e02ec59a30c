// Configuration management module
// Handles TOML configuration for the Open-Meteo endpoints and HTTP settings

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{ApiConfig, Config, ConfigError};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
