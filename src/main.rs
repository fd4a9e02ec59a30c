use clap::{Parser, Subcommand};
use weather_mcp::Result;
use weather_mcp::commands::{lookup_current, lookup_forecast, serve_mcp};
use weather_mcp::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "weather-mcp")]
#[command(about = "Weather lookups from Open-Meteo, exposed as an MCP server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the Open-Meteo endpoints and HTTP settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Look up current weather conditions for a city
    Current {
        /// City name, e.g. "London"
        city: String,
    },
    /// Look up a multi-day forecast for a city
    Forecast {
        /// City name, e.g. "London"
        city: String,
        /// Number of forecast days (1-14)
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(1..=14))]
        days: u8,
    },
    /// Start MCP server on stdio
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout is reserved for protocol traffic.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Current { city } => {
            lookup_current(&city).await?;
        }
        Commands::Forecast { city, days } => {
            lookup_forecast(&city, days).await?;
        }
        Commands::Serve => {
            serve_mcp().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["weather-mcp", "serve"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Serve);
        }
    }

    #[test]
    fn current_command_with_city() {
        let cli = Cli::try_parse_from(["weather-mcp", "current", "London"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Current { city } = parsed.command {
                assert_eq!(city, "London");
            }
        }
    }

    #[test]
    fn forecast_command_defaults_to_seven_days() {
        let cli = Cli::try_parse_from(["weather-mcp", "forecast", "London"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Forecast { city, days } = parsed.command {
                assert_eq!(city, "London");
                assert_eq!(days, 7);
            }
        }
    }

    #[test]
    fn forecast_command_rejects_out_of_range_days() {
        let cli = Cli::try_parse_from(["weather-mcp", "forecast", "London", "--days", "15"]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from(["weather-mcp", "forecast", "London", "--days", "0"]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from(["weather-mcp", "forecast", "London", "--days", "14"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["weather-mcp", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["weather-mcp", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["weather-mcp", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
