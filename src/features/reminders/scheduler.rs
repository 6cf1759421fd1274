//! # Reminder Scheduler
//!
//! Checks the reminder list at startup and then once per minute. A reminder
//! whose due date has passed fires a notification (when permitted) and is
//! rescheduled one period ahead; without permission it is rescheduled silently.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: First check runs at startup instead of one interval later
//! - 1.1.0: Split the pure `check_due` step out of the polling loop
//! - 1.0.0: Minute polling loop

use chrono::{DateTime, TimeZone, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use super::notifier::{NotificationPermission, Notifier};
use super::reminder::Reminder;
use crate::assistant::Assistant;

pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);
pub const NOTIFICATION_TITLE: &str = "Watering Reminder";

pub fn notification_body(plant_name: &str) -> String {
    format!("It's time to water your {plant_name}.")
}

/// One reminder that fired during a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredReminder {
    pub id: String,
    pub plant_name: String,
    pub was_due: i64,
    pub next_due_date: i64,
    /// Whether a notification was actually shown
    pub notified: bool,
}

/// Fire and reschedule every reminder due at `now`
///
/// Each reminder advances at most one period per check.
pub fn check_due<Tz: TimeZone>(
    reminders: &mut [Reminder],
    now: DateTime<Utc>,
    tz: &Tz,
    notifier: &dyn Notifier,
) -> Vec<FiredReminder> {
    let now_ms = now.timestamp_millis();
    let permitted = notifier.permission() == NotificationPermission::Granted;
    let mut fired = Vec::new();

    for reminder in reminders.iter_mut().filter(|r| r.is_due(now_ms)) {
        let was_due = reminder.next_due_date;

        let notified = if permitted {
            match notifier.show(NOTIFICATION_TITLE, &notification_body(&reminder.plant_name)) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to show reminder {}: {e}", reminder.id);
                    false
                }
            }
        } else {
            info!(
                "Reminder {} for {} is due but notifications are not permitted",
                reminder.id, reminder.plant_name
            );
            false
        };

        reminder.advance(tz);
        debug!(
            "Rescheduled reminder {} from {} to {}",
            reminder.id, was_due, reminder.next_due_date
        );

        fired.push(FiredReminder {
            id: reminder.id.clone(),
            plant_name: reminder.plant_name.clone(),
            was_due,
            next_due_date: reminder.next_due_date,
            notified,
        });
    }

    fired
}

/// Background task driving reminder checks
pub struct ReminderScheduler {
    assistant: Arc<Assistant>,
}

impl ReminderScheduler {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self { assistant }
    }

    /// Check reminders now and then every [`CHECK_INTERVAL`], forever
    pub async fn run(self) {
        info!("⏰ Reminder scheduler started (every {CHECK_INTERVAL:?})");
        let mut ticker = tokio::time::interval(CHECK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let fired = self.assistant.check_reminders().await;
            if !fired.is_empty() {
                info!("Fired {} reminder(s)", fired.len());
            }
        }
    }
}
