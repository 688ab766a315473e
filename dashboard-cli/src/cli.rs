use anyhow::Result;
use clap::{Parser, Subcommand};
use dashboard_core::{Config, Coordinator, OpenWeatherClient, PrefStore, Unit, WeatherApi};
use inquire::{InquireError, Select, Text};
use std::sync::Arc;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// One-shot report: current conditions and 5-day forecast for a city.
    Show {
        /// City name, e.g. "London".
        city: String,

        /// Unit system for the report.
        #[arg(long, default_value = "metric")]
        unit: Unit,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Missing API key fails here, before any request is issued.
        let config = Config::from_env()?;
        let client = Arc::new(OpenWeatherClient::new(config.api_key));

        match self.command {
            Some(Command::Show { city, unit }) => show_once(client, &city, unit).await,
            None => dashboard(client).await,
        }
    }
}

/// Print one fetch pair without touching preferences or starting a poll.
async fn show_once(client: Arc<OpenWeatherClient>, city: &str, unit: Unit) -> Result<()> {
    let weather = client.fetch_current(city, unit).await?;
    let forecast = client.fetch_forecast(city, unit).await?;

    println!("{}", render::current_conditions(&weather, unit));
    println!("{}", render::forecast_table(&forecast, unit));

    Ok(())
}

const SEARCH: &str = "Search city";
const TOGGLE: &str = "Toggle units";
const REFRESH: &str = "Refresh view";
const QUIT: &str = "Quit";

/// Interactive dashboard over a running coordinator. The coordinator's
/// background poll keeps the displayed data fresh between actions.
async fn dashboard(client: Arc<OpenWeatherClient>) -> Result<()> {
    let store = PrefStore::open_default()?;
    let coordinator = Coordinator::new(client, store);
    coordinator.start().await;

    loop {
        println!("{}", render::dashboard(&coordinator.state()));

        let choice =
            match Select::new("Weather dashboard", vec![SEARCH, TOGGLE, REFRESH, QUIT]).prompt() {
                Ok(choice) => choice,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
                Err(err) => return Err(err.into()),
            };

        match choice {
            SEARCH => match Text::new("City:").prompt() {
                Ok(city) => coordinator.set_city(city.trim()).await,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {}
                Err(err) => return Err(err.into()),
            },
            TOGGLE => {
                let next = coordinator.state().unit.toggle();
                coordinator.set_unit(next).await;
            }
            REFRESH => {} // re-render only; polling happens in the background
            _ => break,
        }
    }

    Ok(())
}
