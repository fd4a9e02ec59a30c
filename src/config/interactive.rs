use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};
use url::Url;

use super::{ApiConfig, Config};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    println!(
        "{}",
        style("🔧 Weather MCP Configuration Setup").bold().cyan()
    );
    println!();

    let mut config = load_existing_config()?;

    println!("{}", style("Open-Meteo API Configuration").bold().yellow());
    println!("Configure the upstream geocoding and forecast endpoints.");
    println!();

    configure_api(&mut config.api)?;

    println!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        println!("{}", style("✓ Configuration saved successfully!").green());

        let config_path = Config::config_file_path().context("Failed to get config file path")?;
        println!(
            "Configuration saved to: {}",
            style(config_path.display()).cyan()
        );
    } else {
        println!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    println!("{}", style("📋 Current Configuration").bold().cyan());
    println!();

    println!("{}", style("Open-Meteo Settings:").bold().yellow());
    println!(
        "  Geocoding URL: {}",
        style(&config.api.geocoding_url).cyan()
    );
    println!("  Forecast URL: {}", style(&config.api.forecast_url).cyan());
    println!(
        "  HTTP Timeout: {}s",
        style(config.api.timeout_seconds).cyan()
    );

    let config_path = Config::config_file_path().context("Failed to get config file path")?;
    println!();
    println!("Config file: {}", style(config_path.display()).dim());

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load().map_or_else(
        |_| {
            println!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config::default())
        },
        |config| {
            println!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_api(api: &mut ApiConfig) -> Result<()> {
    let geocoding_url: String = Input::new()
        .with_prompt("Geocoding endpoint")
        .default(api.geocoding_url.to_string())
        .validate_with(|input: &String| validate_endpoint(input))
        .interact_text()?;

    let forecast_url: String = Input::new()
        .with_prompt("Forecast endpoint")
        .default(api.forecast_url.to_string())
        .validate_with(|input: &String| validate_endpoint(input))
        .interact_text()?;

    let timeout_seconds: u64 = Input::new()
        .with_prompt("HTTP timeout (seconds)")
        .default(api.timeout_seconds)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if *input == 0 || *input > 300 {
                Err("Timeout must be between 1 and 300 seconds")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    api.set_geocoding_url(Url::parse(&geocoding_url).context("Invalid geocoding URL")?)?;
    api.set_forecast_url(Url::parse(&forecast_url).context("Invalid forecast URL")?)?;
    api.set_timeout_seconds(timeout_seconds)?;

    Ok(())
}

fn validate_endpoint(input: &str) -> Result<(), String> {
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(format!("Unsupported URL scheme: {}", url.scheme())),
        Err(e) => Err(format!("Invalid URL: {e}")),
    }
}
