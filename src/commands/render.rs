//! Terminal rendering for chats, reminders and the garden board

use chrono::{DateTime, Local};

use crate::features::garden::GardenPlanner;
use crate::features::reminders::{NotificationPermission, Reminder};
use crate::features::sessions::{
    ChatMessage, ChatSession, IdentificationFeedback, MessageContent, Role, SessionStore,
};

const BAR_SLOTS: usize = 20;

/// `████████████████░░░░` style bar for a 0-100 confidence
pub fn confidence_bar(confidence: u8) -> String {
    let filled = (usize::from(confidence.min(100)) * BAR_SLOTS + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_SLOTS - filled))
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Model => "Assistant",
    }
}

/// Render one message with its 1-based number
pub fn render_message(number: usize, message: &ChatMessage) -> String {
    let who = speaker(message.role);
    match &message.content {
        MessageContent::Text(text) => format!("[{number}] {who}:\n{text}"),
        MessageContent::Image(image) => {
            let mime = image
                .image_url
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .unwrap_or("image");
            format!("[{number}] {who}:\n📷 {} ({mime} attached)", image.prompt_text)
        }
        MessageContent::Identification(id) => {
            let mut out = format!(
                "[{number}] {who}:\n🌿 {}\nConfidence: {} {}%\n\n{}",
                id.plant_name,
                confidence_bar(id.confidence),
                id.confidence,
                id.care_instructions
            );
            match (id.user_feedback, &id.corrected_name) {
                (Some(IdentificationFeedback::Correct), _) => out.push_str("\n\n✅ You confirmed this identification."),
                (Some(IdentificationFeedback::Incorrect), Some(name)) => {
                    out.push_str(&format!("\n\n✏️ You corrected this to {name}."))
                }
                (Some(IdentificationFeedback::Incorrect), None) => {
                    out.push_str("\n\n❌ You marked this identification as incorrect.")
                }
                (None, _) => out.push_str(&format!(
                    "\n\nIs this right? /feedback {number} correct | /feedback {number} incorrect <name>"
                )),
            }
            out
        }
    }
}

pub fn render_session(session: &ChatSession) -> String {
    let mut out = format!("── {} ──", session.title);
    if session.is_empty() {
        out.push_str("\n(no messages yet)");
    }
    for (i, message) in session.messages.iter().enumerate() {
        out.push_str("\n\n");
        out.push_str(&render_message(i + 1, message));
    }
    out
}

pub fn render_chat_list(store: &SessionStore) -> String {
    if store.is_empty() {
        return "No chats yet. Type a message or /upload a photo to start one.".to_string();
    }

    let active = store.active_id();
    store
        .sessions()
        .iter()
        .enumerate()
        .map(|(i, session)| {
            let marker = if Some(session.id.as_str()) == active { "▶" } else { " " };
            format!(
                "{marker} {}. {} ({} message{})",
                i + 1,
                session.title,
                session.messages.len(),
                if session.messages.len() == 1 { "" } else { "s" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_reminders(
    reminders: &[Reminder],
    permission: NotificationPermission,
    now: &DateTime<Local>,
) -> String {
    let mut out = match permission {
        NotificationPermission::Granted => "🔔 Notifications are on.".to_string(),
        NotificationPermission::Default => "🔕 Notifications are not enabled yet. Use /notify to turn them on.".to_string(),
        NotificationPermission::Denied => {
            "🚫 Notifications are blocked. Set NOTIFICATION_PERMISSION=granted to receive reminders.".to_string()
        }
    };

    if reminders.is_empty() {
        out.push_str("\nNo reminders set.");
        return out;
    }

    let mut sorted: Vec<&Reminder> = reminders.iter().collect();
    sorted.sort_by_key(|r| r.next_due_date);

    let overdue = sorted.iter().filter(|r| r.is_due(now.timestamp_millis())).count();
    if overdue > 0 {
        out.push_str(&format!("\n⚠️ {overdue} overdue"));
    }

    for reminder in sorted {
        out.push_str(&format!(
            "\n💧 {} every {} day{} at {} · {} · id {}",
            reminder.plant_name,
            reminder.frequency_days,
            if reminder.frequency_days == 1 { "" } else { "s" },
            reminder.reminder_time,
            reminder.due_text(now),
            reminder.id
        ));
    }
    out
}

pub fn render_garden(planner: &GardenPlanner) -> String {
    let palette = if planner.palette().is_empty() {
        "(empty, add plants with /garden add <name>)".to_string()
    } else {
        planner.palette().join(", ")
    };
    format!("🪴 Palette: {palette}\nNorth ↑\n{}", planner.grid.render())
}
