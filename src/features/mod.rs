//! # Features
//!
//! Each feature is self-contained and re-exports its public surface here.

// Conversation core
pub mod generator;
pub mod sessions;

// Auxiliary tools
pub mod calendar;
pub mod export;
pub mod garden;
pub mod reminders;
pub mod weather;

pub use calendar::CalendarTask;
pub use export::{ExportFormat, PaginatedDocument};
pub use garden::{CellPos, GardenGrid, GardenPlanner};
pub use generator::{ContentGenerator, GeminiClient, ImagePart};
pub use reminders::{
    FiredReminder, NotificationPermission, Notifier, Reminder, ReminderScheduler, TerminalNotifier,
};
pub use sessions::{ChatMessage, ChatSession, MessageContent, SessionStore};
pub use weather::{Coordinates, WeatherClient, WeatherData, WeatherStatus};
