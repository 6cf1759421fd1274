// Core layer - configuration, clock and text helpers
pub mod core;

// Features layer - all feature modules
pub mod features;

// Persistence
pub mod database;

// Application layer
pub mod assistant;
pub mod commands;

pub use assistant::Assistant;
pub use core::Config;
pub use database::Database;

pub use features::{
    // Conversation
    ChatMessage, ChatSession, ContentGenerator, GeminiClient, SessionStore,
    // Reminders
    ReminderScheduler, TerminalNotifier,
    // Weather
    WeatherClient,
};
