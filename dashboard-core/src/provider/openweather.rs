use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::WeatherError,
    model::{Condition, ForecastEntry, ForecastSnapshot, Unit, WeatherSnapshot},
};

use super::WeatherApi;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const CITY_NOT_FOUND: &str = "City not found";
const FORECAST_NOT_FOUND: &str = "Forecast not found";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different endpoint, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    // Occasionally omitted by the service.
    #[serde(default)]
    visibility: u32,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn first_condition(weather: Vec<OwWeather>) -> Condition {
    weather
        .into_iter()
        .next()
        .map(|w| Condition {
            description: w.description,
            icon: w.icon,
        })
        .unwrap_or_else(Condition::unknown)
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn fetch_current(&self, city: &str, unit: Unit) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", unit.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(
                %status,
                body = %truncate_body(&body),
                "current conditions request rejected"
            );
            return Err(WeatherError::NotFound(CITY_NOT_FOUND));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|err| WeatherError::Parse(format!("current conditions payload: {err}")))?;

        let observed_at = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);

        Ok(WeatherSnapshot {
            city: parsed.name,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed: parsed.wind.speed,
            visibility_m: parsed.visibility,
            condition: first_condition(parsed.weather),
            observed_at,
        })
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        unit: Unit,
    ) -> Result<ForecastSnapshot, WeatherError> {
        let url = format!("{}/forecast", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", unit.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(
                %status,
                body = %truncate_body(&body),
                "forecast request rejected"
            );
            return Err(WeatherError::NotFound(FORECAST_NOT_FOUND));
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body)
            .map_err(|err| WeatherError::Parse(format!("forecast payload: {err}")))?;

        let entries = parsed
            .list
            .into_iter()
            .map(|entry| ForecastEntry {
                timestamp: entry.dt_txt,
                temperature: entry.main.temp,
                temp_min: entry.main.temp_min,
                temp_max: entry.main.temp_max,
                humidity: entry.main.humidity,
                wind_speed: entry.wind.speed,
                condition: first_condition(entry.weather),
            })
            .collect();

        Ok(ForecastSnapshot {
            city: parsed.city.name,
            entries,
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_body() -> serde_json::Value {
        json!({
            "name": "London",
            "dt": 1_754_000_000,
            "visibility": 10_000,
            "main": {
                "temp": 12.5,
                "feels_like": 11.2,
                "temp_min": 9.8,
                "temp_max": 14.1,
                "pressure": 1012,
                "humidity": 72
            },
            "weather": [{"description": "light rain", "icon": "10d"}],
            "wind": {"speed": 4.1}
        })
    }

    fn forecast_body() -> serde_json::Value {
        json!({
            "city": {"name": "London"},
            "list": [
                {
                    "dt_txt": "2025-08-06 12:00:00",
                    "main": {
                        "temp": 13.0,
                        "feels_like": 12.2,
                        "temp_min": 9.0,
                        "temp_max": 14.0,
                        "pressure": 1010,
                        "humidity": 60
                    },
                    "weather": [{"description": "scattered clouds", "icon": "03d"}],
                    "wind": {"speed": 3.0}
                },
                {
                    "dt_txt": "2025-08-06 15:00:00",
                    "main": {
                        "temp": 14.5,
                        "feels_like": 13.9,
                        "temp_min": 10.0,
                        "temp_max": 15.0,
                        "pressure": 1009,
                        "humidity": 55
                    },
                    "weather": [],
                    "wind": {"speed": 3.4}
                }
            ]
        })
    }

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::with_base_url("TESTKEY".to_string(), server.uri())
    }

    #[tokio::test]
    async fn current_request_carries_city_key_and_unit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "TESTKEY"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = client_for(&server)
            .fetch_current("London", Unit::Imperial)
            .await
            .expect("fetch must succeed");

        assert_eq!(snapshot.city, "London");
        server.verify().await;
    }

    #[tokio::test]
    async fn current_payload_is_parsed_into_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;

        let snapshot = client_for(&server)
            .fetch_current("London", Unit::Metric)
            .await
            .expect("fetch must succeed");

        assert_eq!(snapshot.temperature, 12.5);
        assert_eq!(snapshot.feels_like, 11.2);
        assert_eq!(snapshot.humidity, 72);
        assert_eq!(snapshot.pressure_hpa, 1012);
        assert_eq!(snapshot.wind_speed, 4.1);
        assert_eq!(snapshot.visibility_m, 10_000);
        assert_eq!(snapshot.condition.description, "light rain");
        assert_eq!(snapshot.condition.icon, "10d");
        assert_eq!(snapshot.observed_at.timestamp(), 1_754_000_000);
    }

    #[tokio::test]
    async fn forecast_payload_is_parsed_into_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let snapshot = client_for(&server)
            .fetch_forecast("London", Unit::Metric)
            .await
            .expect("fetch must succeed");

        assert_eq!(snapshot.city, "London");
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].timestamp, "2025-08-06 12:00:00");
        assert_eq!(snapshot.entries[0].temp_max, 14.0);
        // Missing weather array entry degrades to the unknown condition.
        assert_eq!(snapshot.entries[1].condition.description, "Unknown");
    }

    #[tokio::test]
    async fn non_success_current_maps_to_city_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"cod\":\"404\"}"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_current("zzzznotacity", Unit::Metric)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "City not found");
    }

    #[tokio::test]
    async fn non_success_forecast_maps_to_forecast_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_forecast("London", Unit::Metric)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Forecast not found");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_current("London", Unit::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Parse(_)));
    }
}
