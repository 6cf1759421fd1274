//! # Weather Feature
//!
//! Current conditions for the configured location, used for the status line,
//! optional weather context on chat messages, and calendar personalization.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod client;
pub mod codes;

pub use client::{
    Coordinates, WeatherClient, WeatherData, WeatherStatus, LOCATION_NOT_CONFIGURED,
    WEATHER_FETCH_FAILED,
};
pub use codes::{describe_weather_code, WeatherCondition};
