//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Wrap the assistant, weather client and export settings
//! - 1.0.0: Initial implementation with core shared state

use std::path::PathBuf;
use std::sync::Arc;

use crate::assistant::Assistant;
use crate::features::weather::{Coordinates, WeatherClient, WeatherStatus};

/// Services every handler can reach
#[derive(Clone)]
pub struct CommandContext {
    pub assistant: Arc<Assistant>,
    pub weather_client: WeatherClient,
    pub coordinates: Option<Coordinates>,
    /// Default directory for `/export`
    pub export_dir: PathBuf,
}

impl CommandContext {
    pub fn new(
        assistant: Arc<Assistant>,
        weather_client: WeatherClient,
        coordinates: Option<Coordinates>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            assistant,
            weather_client,
            coordinates,
            export_dir,
        }
    }

    /// Fetch current weather for the configured location and store it
    pub async fn refresh_weather(&self) -> WeatherStatus {
        let status = self.weather_client.resolve(self.coordinates).await;
        self.assistant.set_weather(status.clone()).await;
        status
    }
}
