//! # Configuration
//!
//! Optional YAML file plus environment overrides. Environment variables always
//! win so a `.env` file (loaded by the binary through dotenvy) can adjust a
//! shared `verdant.yaml`.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add YAML config file layer (`VERDANT_CONFIG`)
//! - 1.0.0: Environment-only configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::features::reminders::NotificationPermission;
use crate::features::weather::Coordinates;

pub const DEFAULT_CONFIG_PATH: &str = "verdant.yaml";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.open-meteo.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub database_path: String,
    pub log_level: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub weather_base_url: String,
    pub notification_permission: NotificationPermission,
    pub export_dir: String,
}

/// On-disk shape of `verdant.yaml`; every key is optional
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    pub database_path: Option<String>,
    pub log_level: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub weather_base_url: Option<String>,
    pub notification_permission: Option<String>,
    pub export_dir: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let file: ConfigFile = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid YAML in config file {path}"))?;
        Ok(file)
    }
}

impl Config {
    /// Load from `VERDANT_CONFIG` (or `verdant.yaml` when present) and the process environment
    pub fn load() -> Result<Self> {
        let explicit = std::env::var("VERDANT_CONFIG").ok();
        let file = match explicit.as_deref() {
            Some(path) => ConfigFile::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => ConfigFile::load(DEFAULT_CONFIG_PATH)?,
            None => ConfigFile::default(),
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a config file with an environment lookup
    pub fn from_sources<F>(file: ConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = env("GEMINI_API_KEY")
            .or_else(|| env("API_KEY"))
            .or(file.gemini_api_key)
            .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;

        let latitude = match env("VERDANT_LATITUDE") {
            Some(v) => Some(v.parse::<f64>().context("VERDANT_LATITUDE must be a number")?),
            None => file.latitude,
        };
        let longitude = match env("VERDANT_LONGITUDE") {
            Some(v) => Some(v.parse::<f64>().context("VERDANT_LONGITUDE must be a number")?),
            None => file.longitude,
        };

        let notification_permission = env("NOTIFICATION_PERMISSION")
            .or(file.notification_permission)
            .map(|v| v.parse::<NotificationPermission>())
            .transpose()?
            .unwrap_or_default();

        Ok(Config {
            gemini_api_key,
            gemini_model: env("GEMINI_MODEL")
                .or(file.gemini_model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: env("GEMINI_BASE_URL")
                .or(file.gemini_base_url)
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            database_path: env("DATABASE_PATH")
                .or(file.database_path)
                .unwrap_or_else(|| "verdant.db".to_string()),
            log_level: env("LOG_LEVEL")
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            latitude,
            longitude,
            weather_base_url: env("WEATHER_BASE_URL")
                .or(file.weather_base_url)
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            notification_permission,
            export_dir: env("EXPORT_DIR")
                .or(file.export_dir)
                .unwrap_or_else(|| ".".to_string()),
        })
    }

    /// Configured location, if both coordinates are present
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        }
    }
}
