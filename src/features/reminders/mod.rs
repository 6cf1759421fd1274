//! # Reminders Feature
//!
//! Recurring watering reminders with minute polling and notification delivery.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod notifier;
pub mod reminder;
pub mod scheduler;

pub use notifier::{NotificationPermission, Notifier, TerminalNotifier};
pub use reminder::{parse_reminder_time, Reminder, MAX_FREQUENCY_DAYS, MIN_FREQUENCY_DAYS};
pub use scheduler::{check_due, FiredReminder, ReminderScheduler, CHECK_INTERVAL, NOTIFICATION_TITLE};
