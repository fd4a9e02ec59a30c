//! Presentation Formatter
//!
//! Pure rendering of weather data into markdown-style text reports. No I/O:
//! the generation timestamp is an input, not a clock read.


use chrono::{DateTime, Local, NaiveDate};
use std::fmt::Write;

use crate::api::{CurrentConditions, DailyForecast};

/// A gust clause is added to a current-conditions report only when gusts
/// exceed this multiple of the sustained speed.
pub const CURRENT_GUST_RATIO: f64 = 1.5;

/// Forecast reports use a lower gust threshold than current conditions.
pub const FORECAST_GUST_RATIO: f64 = 1.3;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Map a WMO weather code to its human-readable description.
#[inline]
pub fn describe_weather_code(code: u32) -> String {
    let description = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        other => return format!("Unknown (code: {other})"),
    };
    description.to_string()
}

/// Map wind direction degrees to a 16-point compass label.
#[inline]
pub fn compass_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / 22.5).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

fn wind_clause(speed: f64, direction: f64, gusts: f64, gust_ratio: f64) -> String {
    let mut clause = format!("{:.1} km/h {}", speed, compass_direction(direction));
    if gusts > speed * gust_ratio {
        let _ = write!(clause, " (gusts to {gusts:.1} km/h)");
    }
    clause
}

/// Render a current-conditions report for the given location label.
#[inline]
pub fn current_report(
    label: &str,
    current: &CurrentConditions,
    generated_at: DateTime<Local>,
) -> String {
    let mut report = format!("# Current Weather for {label}\n\n");

    let _ = writeln!(
        report,
        "**Conditions:** {}",
        describe_weather_code(current.weather_code)
    );
    let _ = writeln!(
        report,
        "**Temperature:** {:.1}°C (feels like {:.1}°C)",
        current.temperature_2m, current.apparent_temperature
    );
    let _ = writeln!(report, "**Humidity:** {:.0}%", current.relative_humidity_2m);
    let _ = writeln!(
        report,
        "**Wind:** {}",
        wind_clause(
            current.wind_speed_10m,
            current.wind_direction_10m,
            current.wind_gusts_10m,
            CURRENT_GUST_RATIO,
        )
    );
    let _ = writeln!(report, "**Cloud cover:** {:.0}%", current.cloud_cover);

    let _ = write!(report, "**Precipitation:** {:.1} mm", current.precipitation);
    if current.rain > 0.0 {
        let _ = write!(report, " (rain: {:.1} mm)", current.rain);
    }
    report.push('\n');

    let _ = writeln!(
        report,
        "\n_Report generated at {}_",
        generated_at.format("%Y-%m-%d %H:%M")
    );

    report
}

/// Render a multi-day forecast report, one section per day, terminated by a
/// single shared generation timestamp.
#[inline]
pub fn forecast_report(
    label: &str,
    forecast: &DailyForecast,
    generated_at: DateTime<Local>,
) -> String {
    let days = forecast.time.len();
    let mut report = format!("# {days}-Day Forecast for {label}\n");

    for (i, date) in forecast.time.iter().enumerate() {
        let _ = writeln!(report, "\n## {}", day_heading(date));

        let code = forecast.weather_code.get(i).copied().unwrap_or_default();
        let _ = writeln!(report, "**Conditions:** {}", describe_weather_code(code));

        let low = forecast.temperature_2m_min.get(i).copied().unwrap_or_default();
        let high = forecast.temperature_2m_max.get(i).copied().unwrap_or_default();
        let _ = writeln!(report, "**Temperature:** {low:.1}°C to {high:.1}°C");

        let precipitation = forecast.precipitation_sum.get(i).copied().unwrap_or_default();
        let hours = forecast.precipitation_hours.get(i).copied().unwrap_or_default();
        let _ = writeln!(
            report,
            "**Precipitation:** {precipitation:.1} mm over {hours:.0} h"
        );

        let _ = writeln!(
            report,
            "**Wind:** {}",
            wind_clause(
                forecast.wind_speed_10m_max.get(i).copied().unwrap_or_default(),
                forecast
                    .wind_direction_10m_dominant
                    .get(i)
                    .copied()
                    .unwrap_or_default(),
                forecast.wind_gusts_10m_max.get(i).copied().unwrap_or_default(),
                FORECAST_GUST_RATIO,
            )
        );
    }

    let _ = writeln!(
        report,
        "\n_Report generated at {}_",
        generated_at.format("%Y-%m-%d %H:%M")
    );

    report
}

/// Format a label for a lookup with no place name, coordinates only.
#[inline]
pub fn coordinate_label(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4}, {longitude:.4}")
}

fn day_heading(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_or_else(
        |_| date.to_string(),
        |parsed| parsed.format("%A, %B %-d").to_string(),
    )
}
