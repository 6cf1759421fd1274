//! Open-Meteo current-weather client

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use serde::Deserialize;

use super::codes::WeatherCondition;

pub const LOCATION_NOT_CONFIGURED: &str = "Location not configured.";
pub const WEATHER_FETCH_FAILED: &str = "Could not fetch weather.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherData {
    /// Degrees Celsius
    pub temperature: f64,
    /// WMO code
    pub weather_code: u16,
}

impl WeatherData {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.weather_code)
    }

    pub fn description(&self) -> &'static str {
        self.condition().description()
    }

    /// Prefix prepended to a chat message when weather context is enabled
    pub fn context_prefix(&self) -> String {
        format!(
            "(My local weather is currently {}°C and {}) ",
            self.temperature.round() as i64,
            self.description()
        )
    }
}

/// Transient weather/location state; coordinates are only kept once a fetch succeeded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherStatus {
    pub weather: Option<WeatherData>,
    pub coords: Option<Coordinates>,
    pub location_error: Option<String>,
}

impl WeatherStatus {
    pub fn unavailable(reason: &str) -> Self {
        Self {
            weather: None,
            coords: None,
            location_error: Some(reason.to_string()),
        }
    }

    /// One-line status for display
    pub fn summary(&self) -> String {
        match (&self.weather, &self.location_error) {
            (Some(w), _) => format!(
                "{} {}°C, {}",
                w.condition().icon(),
                w.temperature.round() as i64,
                w.description()
            ),
            (None, Some(err)) => err.clone(),
            (None, None) => "Fetching weather...".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f64,
    weathercode: u16,
}

#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch(&self, coords: Coordinates) -> Result<WeatherData> {
        let response = self
            .http
            .get(format!("{}/v1/forecast", self.base_url))
            .query(&[
                ("latitude", coords.lat.to_string()),
                ("longitude", coords.lon.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Weather request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to fetch weather data: {}", response.status()));
        }

        let body: ForecastResponse = response.json().await?;
        Ok(WeatherData {
            temperature: body.current_weather.temperature,
            weather_code: body.current_weather.weathercode,
        })
    }

    /// Resolve the startup weather status; failures become a status string
    pub async fn resolve(&self, coords: Option<Coordinates>) -> WeatherStatus {
        let Some(coords) = coords else {
            warn!("No coordinates configured; weather and calendar are unavailable");
            return WeatherStatus::unavailable(LOCATION_NOT_CONFIGURED);
        };

        match self.fetch(coords).await {
            Ok(weather) => {
                info!(
                    "Weather at {:.2},{:.2}: {}°C code {}",
                    coords.lat, coords.lon, weather.temperature, weather.weather_code
                );
                WeatherStatus {
                    weather: Some(weather),
                    coords: Some(coords),
                    location_error: None,
                }
            }
            Err(e) => {
                error!("Weather API error: {e}");
                WeatherStatus::unavailable(WEATHER_FETCH_FAILED)
            }
        }
    }
}
