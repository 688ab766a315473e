//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - The coordinator owning dashboard state and the background poll
//! - Abstraction over the remote weather service
//! - Persisted user preferences (last city, unit system)
//! - Startup configuration & credentials handling
//!
//! It is used by `dashboard-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod prefs;
pub mod provider;

pub use config::Config;
pub use coordinator::{Coordinator, POLL_PERIOD, WeatherState};
pub use error::WeatherError;
pub use model::{Condition, ForecastEntry, ForecastSnapshot, Unit, WeatherSnapshot};
pub use prefs::PrefStore;
pub use provider::{WeatherApi, openweather::OpenWeatherClient};
