//! # Calendar Feature
//!
//! Generates a month of care tasks for every plant the user has chatted
//! about, personalized with the current date and location. Results are kept
//! for the rest of the process; a failed attempt can simply be retried.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::strip_json_fence;
use crate::features::weather::WeatherStatus;

pub const NO_PLANTS_MESSAGE: &str =
    "You haven't identified any plants yet. Start a chat about a plant to get calendar tasks.";
pub const GENERATION_FAILED_MESSAGE: &str = "Sorry, I couldn't generate the calendar. The response might have been in an unexpected format. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarTask {
    pub plant: String,
    pub task: String,
    pub timing: String,
}

pub fn location_required_message(location_error: Option<&str>) -> String {
    format!(
        "Location access is required for a personalized calendar. {}",
        location_error.unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

/// Build the generation prompt, or the user-facing reason none can be built
pub fn calendar_prompt(weather: &WeatherStatus, plants: &[String], today: NaiveDate) -> Result<String> {
    let coords = match (&weather.location_error, weather.coords) {
        (None, Some(coords)) => coords,
        (error, _) => bail!(location_required_message(error.as_deref())),
    };
    if plants.is_empty() {
        bail!(NO_PLANTS_MESSAGE);
    }

    Ok(format!(
        "You are a master gardener creating a personalized task calendar. Based on the following information, generate a list of gardening tasks for the next month.\n\n\
         Current Date: {}\n\
         Location (Latitude, Longitude): {}, {}\n\
         My plants: {}\n\n\
         For each plant, suggest relevant tasks like planting, pruning, fertilizing, or pest control. \
         Provide a general timing for each task (e.g., 'Early in the month', 'Mid-month', 'End of the month').\n\n\
         Return the response ONLY as a JSON array of objects, where each object has the following keys: \"plant\", \"task\", and \"timing\". \
         Do not include any other text or markdown formatting.\n\
         Example format:\n\
         [\n  \
         {{ \"plant\": \"Rose Bush\", \"task\": \"Prune back dead or weak canes to encourage new growth.\", \"timing\": \"Early next week\" }},\n  \
         {{ \"plant\": \"Tomato Plant\", \"task\": \"Apply a balanced fertilizer, as fruiting begins.\", \"timing\": \"Mid-month\" }}\n\
         ]",
        today.format("%B %-d, %Y"),
        coords.lat,
        coords.lon,
        plants.join(", ")
    ))
}

pub fn parse_calendar(response: &str) -> Result<Vec<CalendarTask>> {
    let cleaned = strip_json_fence(response);
    serde_json::from_str(&cleaned).context("Calendar response was not a JSON array of tasks")
}

/// Group tasks by plant, keeping the order in which plants first appear
pub fn group_by_plant(tasks: &[CalendarTask]) -> Vec<(&str, Vec<&CalendarTask>)> {
    let mut groups: Vec<(&str, Vec<&CalendarTask>)> = Vec::new();
    for task in tasks {
        match groups.iter_mut().find(|(plant, _)| *plant == task.plant) {
            Some((_, items)) => items.push(task),
            None => groups.push((task.plant.as_str(), vec![task])),
        }
    }
    groups
}

/// Render tasks as a plain-text calendar panel
pub fn render_calendar(tasks: &[CalendarTask]) -> String {
    if tasks.is_empty() {
        return "No tasks for this month.".to_string();
    }

    let mut out = String::from("📅 Gardening Calendar\n");
    for (plant, items) in group_by_plant(tasks) {
        out.push_str(&format!("\n🌱 {plant}\n"));
        for item in items {
            out.push_str(&format!("  • [{}] {}\n", item.timing, item.task));
        }
    }
    out.trim_end().to_string()
}
