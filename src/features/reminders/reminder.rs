//! Watering reminder record and due-date arithmetic
//!
//! Due dates are unix milliseconds. Rescheduling adds whole calendar days in
//! the supplied time zone so the wall-clock time of day survives DST changes.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Days, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_FREQUENCY_DAYS: u32 = 1;
pub const MAX_FREQUENCY_DAYS: u32 = 365;
const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub plant_name: String,
    pub frequency_days: u32,
    /// `HH:mm`
    pub reminder_time: String,
    /// Unix milliseconds
    pub next_due_date: i64,
}

/// Parse an `HH:mm` time of day
pub fn parse_reminder_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("Invalid reminder time '{value}' (expected HH:mm)"))
}

/// Resolve a local wall-clock time, skipping forward past a DST gap
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + chrono::Duration::hours(1))).earliest())
}

/// Today at `at` if that is still in the future, otherwise tomorrow at `at`
pub fn first_due_date<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> Result<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive().and_time(at);

    let candidate = resolve_local(&tz, today).context("Reminder time does not exist today")?;
    if candidate > *now {
        return Ok(candidate);
    }

    let tomorrow = today
        .checked_add_days(Days::new(1))
        .context("Reminder date out of range")?;
    resolve_local(&tz, tomorrow).context("Reminder time does not exist tomorrow")
}

/// Move a due date forward by `days` calendar days, keeping its local time of day
pub fn advance_due_date<Tz: TimeZone>(due_ms: i64, days: u32, tz: &Tz) -> i64 {
    let advanced = DateTime::<Utc>::from_timestamp_millis(due_ms)
        .map(|due| due.with_timezone(tz).naive_local())
        .and_then(|local| local.checked_add_days(Days::new(u64::from(days))))
        .and_then(|local| resolve_local(tz, local));

    match advanced {
        Some(next) => next.timestamp_millis(),
        None => due_ms + i64::from(days) * DAY_MS,
    }
}

impl Reminder {
    /// Create a reminder whose first due date is the next occurrence of `reminder_time`
    pub fn new<Tz: TimeZone>(
        id: impl Into<String>,
        plant_name: impl Into<String>,
        frequency_days: u32,
        reminder_time: &str,
        now: &DateTime<Tz>,
    ) -> Result<Self> {
        let plant_name = plant_name.into();
        if plant_name.trim().is_empty() {
            bail!("A reminder needs a plant name");
        }
        if !(MIN_FREQUENCY_DAYS..=MAX_FREQUENCY_DAYS).contains(&frequency_days) {
            bail!(
                "Frequency must be between {MIN_FREQUENCY_DAYS} and {MAX_FREQUENCY_DAYS} days"
            );
        }

        let at = parse_reminder_time(reminder_time)?;
        let first = first_due_date(now, at)?;

        Ok(Self {
            id: id.into(),
            plant_name: plant_name.trim().to_string(),
            frequency_days,
            reminder_time: at.format("%H:%M").to_string(),
            next_due_date: first.timestamp_millis(),
        })
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        now_ms >= self.next_due_date
    }

    /// Reschedule one period ahead
    pub fn advance<Tz: TimeZone>(&mut self, tz: &Tz) {
        self.next_due_date = advance_due_date(self.next_due_date, self.frequency_days, tz);
    }

    /// Human-readable due text relative to `now`, in `now`'s time zone
    ///
    /// Times read like `9:05 AM`.
    pub fn due_text<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let tz = now.timezone();
        let Some(due) = DateTime::<Utc>::from_timestamp_millis(self.next_due_date) else {
            return format!("Due at {}", self.reminder_time);
        };
        let due = due.with_timezone(&tz);
        let time = due.format("%-I:%M %p");

        let diff_days = (due.date_naive() - now.date_naive()).num_days();
        match diff_days {
            d if d < 0 => format!("Overdue (was due at {time})"),
            0 => format!("Due today at {time}"),
            1 => format!("Due tomorrow at {time}"),
            d => format!("Due in {d} days at {time}"),
        }
    }
}
