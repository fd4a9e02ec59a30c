use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
}

/// Upstream Open-Meteo endpoints. Both URLs default to the public API but can
/// be repointed, e.g. at a self-hosted instance or a test double.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    pub geocoding_url: Url,
    pub forecast_url: Url,
    pub timeout_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL scheme for {0} (must be http or https)")]
    InvalidUrlScheme(Url),
    #[error("Invalid timeout: {0} seconds (must be between 1 and 300)")]
    InvalidTimeout(u64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            api: ApiConfig {
                geocoding_url: Url::parse(DEFAULT_GEOCODING_URL)
                    .expect("default geocoding URL is valid"),
                forecast_url: Url::parse(DEFAULT_FORECAST_URL)
                    .expect("default forecast URL is valid"),
                timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            },
        }
    }
}

impl Config {
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".weather-mcp"))
            .or({
                #[cfg(windows)]
                {
                    dirs::data_dir().map(|data| data.join("weather-mcp"))
                }
                #[cfg(not(windows))]
                {
                    None
                }
            })
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    #[inline]
    pub fn load() -> Result<Self> {
        let config_path =
            Self::config_file_path().context("Failed to determine config file path")?;
        Self::load_from(&config_path)
    }

    #[inline]
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir().context("Failed to determine config directory")?;

        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        self.save_to(&config_dir.join("config.toml"))
    }

    #[inline]
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()
    }
}

impl ApiConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.geocoding_url, &self.forecast_url] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrlScheme(url.clone()));
            }
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        Ok(())
    }

    #[inline]
    pub fn set_geocoding_url(&mut self, url: Url) -> Result<(), ConfigError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrlScheme(url));
        }
        self.geocoding_url = url;
        Ok(())
    }

    #[inline]
    pub fn set_forecast_url(&mut self, url: Url) -> Result<(), ConfigError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrlScheme(url));
        }
        self.forecast_url = url;
        Ok(())
    }

    #[inline]
    pub fn set_timeout_seconds(&mut self, timeout_seconds: u64) -> Result<(), ConfigError> {
        if timeout_seconds == 0 || timeout_seconds > 300 {
            return Err(ConfigError::InvalidTimeout(timeout_seconds));
        }
        self.timeout_seconds = timeout_seconds;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(
            config.api.geocoding_url.as_str(),
            "https://geocoding-api.open-meteo.com/v1/search"
        );
        assert_eq!(
            config.api.forecast_url.as_str(),
            "https://api.open-meteo.com/v1/forecast"
        );
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = config.clone();
        invalid_config.api.geocoding_url =
            Url::parse("ftp://example.com/search").expect("url parses");
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = config.clone();
        invalid_config.api.timeout_seconds = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = config;
        invalid_config.api.timeout_seconds = 301;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn toml_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
        let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
        assert_eq!(config, parsed_config);
    }

    #[test]
    fn setter_validation() {
        let mut config = Config::default().api;

        assert!(
            config
                .set_geocoding_url(Url::parse("http://localhost:8080/v1/search").expect("valid"))
                .is_ok()
        );
        assert!(config.set_timeout_seconds(60).is_ok());

        assert!(
            config
                .set_forecast_url(Url::parse("file:///tmp/forecast").expect("valid"))
                .is_err()
        );
        assert!(config.set_timeout_seconds(0).is_err());
        assert!(config.set_timeout_seconds(301).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.api.timeout_seconds = 12;
        config.save_to(&config_path).expect("save succeeds");

        let loaded = Config::load_from(&config_path).expect("load succeeds");
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_missing_file_falls_back_to_default() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");
        let config_path = temp_dir.path().join("does-not-exist.toml");

        let loaded = Config::load_from(&config_path).expect("load succeeds");
        assert_eq!(loaded, Config::default());
    }
}
