/// Fallback banner text for failures that carry no message of their own.
pub const GENERIC_FETCH_ERROR: &str = "Failed to fetch weather data";

/// Errors produced by the core.
///
/// `Network` and `Parse` are split from `NotFound` for future retry
/// policies; the coordinator treats all fetch failures the same today.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The remote service answered with a non-success status.
    #[error("{0}")]
    NotFound(&'static str),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    /// Missing or unusable startup configuration.
    #[error("{0}")]
    Config(String),
}

impl WeatherError {
    /// Text suitable for the dashboard's error banner.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            GENERIC_FETCH_ERROR.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_fixed_message() {
        let err = WeatherError::NotFound("City not found");
        assert_eq!(err.user_message(), "City not found");
    }

    #[test]
    fn config_error_carries_its_message() {
        let err = WeatherError::Config("OPENWEATHER_API_KEY is not set".to_string());
        assert!(err.user_message().contains("OPENWEATHER_API_KEY"));
    }
}
