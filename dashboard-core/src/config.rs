use std::env;

use crate::error::WeatherError;

/// Environment variable holding the OpenWeather API key.
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Startup configuration for the dashboard.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
}

impl Config {
    /// Read the API key from the process environment.
    ///
    /// A missing key is a startup error, not a deferred fetch failure:
    /// the dashboard must never issue unauthorized requests.
    pub fn from_env() -> Result<Self, WeatherError> {
        Self::from_value(API_KEY_VAR, env::var(API_KEY_VAR).ok())
    }

    fn from_value(name: &str, value: Option<String>) -> Result<Self, WeatherError> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(Self { api_key: key }),
            _ => Err(WeatherError::Config(format!(
                "{name} is not set.\n\
                 Hint: export your OpenWeather API key as {name} before starting the dashboard."
            ))),
        }
    }
}
