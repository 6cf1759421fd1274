//! Per-command handler implementations
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Add CalendarHandler, GardenHandler and ExportHandler
//! - 1.1.0: Add RemindHandler and WeatherHandler
//! - 1.0.0: Initial extraction of chat, session and utility commands

pub mod calendar;
pub mod chat;
pub mod export;
pub mod garden;
pub mod remind;
pub mod sessions;
pub mod utility;
pub mod weather;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Create all registered command handlers
///
/// Returns a vector of handlers ready to be registered with CommandRegistry.
/// The order is the order of `/help`.
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![
        Arc::new(utility::UtilityHandler),
        Arc::new(sessions::SessionsHandler),
        Arc::new(chat::ChatHandler),
        Arc::new(weather::WeatherHandler),
        Arc::new(remind::RemindHandler),
        Arc::new(calendar::CalendarHandler),
        Arc::new(garden::GardenHandler),
        Arc::new(export::ExportHandler),
    ]
}

/// Every handler's `(usage, description)` lines, in registration order
pub fn help_lines() -> Vec<(&'static str, &'static str)> {
    create_all_handlers()
        .iter()
        .flat_map(|handler| handler.help().iter().copied())
        .collect()
}
