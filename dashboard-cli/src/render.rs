//! Plain-text rendering of coordinator state.

use chrono::NaiveDateTime;
use dashboard_core::{ForecastSnapshot, Unit, WeatherSnapshot, WeatherState};
use std::fmt::Write;

/// Full dashboard view: error banner, current conditions, forecast.
pub fn dashboard(state: &WeatherState) -> String {
    if state.city.is_empty() {
        return "No city selected yet. Search for one to get started.\n".to_string();
    }

    if let Some(error) = &state.error {
        return format!("!! {error}\n");
    }

    match (&state.weather, &state.forecast) {
        (Some(weather), Some(forecast)) => {
            let mut out = current_conditions(weather, state.unit);
            out.push('\n');
            out.push_str(&forecast_table(forecast, state.unit));
            out
        }
        _ => format!("Loading weather for {}...\n", state.city),
    }
}

pub fn current_conditions(weather: &WeatherSnapshot, unit: Unit) -> String {
    let sym = unit.temperature_symbol();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}  {:.0}{sym} (feels like {:.0}{sym})",
        weather.city, weather.temperature, weather.feels_like
    );
    let _ = writeln!(out, "  {}", capitalize(&weather.condition.description));
    let _ = writeln!(out, "  Humidity   {}%", weather.humidity);
    let _ = writeln!(out, "  Wind       {} {}", weather.wind_speed, unit.wind_symbol());
    let _ = writeln!(out, "  Visibility {}", unit.format_visibility(weather.visibility_m));
    let _ = writeln!(out, "  Pressure   {} hPa", weather.pressure_hpa);

    out
}

/// One line per day, picked from the midday forecast entries.
pub fn forecast_table(forecast: &ForecastSnapshot, unit: Unit) -> String {
    let sym = unit.temperature_symbol();
    let mut out = String::new();

    let _ = writeln!(out, "5-day forecast for {}", forecast.city);
    for (index, entry) in forecast.daily().iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:<10} {:>3.0}{sym}  high {:.0} / low {:.0}  {}, humidity {}%",
            day_label(&entry.timestamp, index == 0),
            entry.temperature,
            entry.temp_max,
            entry.temp_min,
            capitalize(&entry.condition.description),
            entry.humidity,
        );
    }

    out
}

fn day_label(timestamp: &str, is_today: bool) -> String {
    if is_today {
        return "Today".to_string();
    }
    match NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S") {
        Ok(dt) => dt.format("%a %b %d").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
