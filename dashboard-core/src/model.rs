use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measurement system sent to the weather service and used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    /// The other unit system; used by the dashboard's toggle action.
    pub fn toggle(&self) -> Unit {
        match self {
            Unit::Metric => Unit::Imperial,
            Unit::Imperial => Unit::Metric,
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Unit::Metric => "°C",
            Unit::Imperial => "°F",
        }
    }

    pub fn wind_symbol(&self) -> &'static str {
        match self {
            Unit::Metric => "m/s",
            Unit::Imperial => "mph",
        }
    }

    /// The service always reports visibility in meters, regardless of the
    /// `units` query parameter.
    pub fn format_visibility(&self, meters: u32) -> String {
        match self {
            Unit::Metric => format!("{:.1} km", f64::from(meters) / 1000.0),
            Unit::Imperial => format!("{:.1} mi", f64::from(meters) * 0.000_621_371),
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            _ => Err(format!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// One weather-condition descriptor as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    /// Service icon code, e.g. "10d".
    pub icon: String,
}

impl Condition {
    pub fn unknown() -> Self {
        Self {
            description: "Unknown".to_string(),
            icon: String::new(),
        }
    }
}

/// Current conditions for a city. Replaced wholesale on every successful
/// fetch; never partially updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure_hpa: u32,
    pub wind_speed: f64,
    pub visibility_m: u32,
    pub condition: Condition,
    pub observed_at: DateTime<Utc>,
}

/// One timestamped entry of the 5-day / 3-hour forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Service-formatted timestamp, e.g. "2025-08-06 12:00:00".
    pub timestamp: String,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub condition: Condition,
}

/// Ordered 5-day forecast for a city. Replaced wholesale, like
/// [`WeatherSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub city: String,
    pub entries: Vec<ForecastEntry>,
}

impl ForecastSnapshot {
    /// One entry per day, picked at the midday timestamp.
    pub fn daily(&self) -> Vec<&ForecastEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.timestamp.contains("12:00:00"))
            .collect()
    }
}
