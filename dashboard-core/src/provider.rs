use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{ForecastSnapshot, Unit, WeatherSnapshot},
};

pub mod openweather;

/// Abstraction over the remote weather service.
///
/// Both calls are single suspending reads; failures are reported
/// immediately, with no retry or backoff.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    /// Current conditions for a city.
    async fn fetch_current(&self, city: &str, unit: Unit) -> Result<WeatherSnapshot, WeatherError>;

    /// 5-day / 3-hour forecast for a city.
    async fn fetch_forecast(&self, city: &str, unit: Unit)
    -> Result<ForecastSnapshot, WeatherError>;
}
