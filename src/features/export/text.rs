//! Plain-text transcript export

use crate::core::safe_file_stem;
use crate::features::sessions::{ChatMessage, ChatSession, MessageContent, Role};

pub const RULE: &str = "-----------------------------------";

pub fn speaker_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Model => "Assistant",
    }
}

/// Body of one message as it appears in exports
///
/// `gap` separates an identification summary from its care instructions.
pub fn message_body(message: &ChatMessage, gap: &str) -> String {
    match &message.content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Identification(id) => format!(
            "[Identified {} with {}% confidence]{gap}{}",
            id.plant_name, id.confidence, id.care_instructions
        ),
        MessageContent::Image(image) => format!("{}\n(Image Attached)", image.prompt_text),
    }
}

/// Full transcript with a title/timestamp header
pub fn format_chat_text(session: &ChatSession, exported_at: &str) -> String {
    let mut content = format!("Chat Title: {}\n", session.title);
    content.push_str(&format!("Exported on: {exported_at}\n\n"));
    content.push_str(RULE);
    content.push_str("\n\n");

    for message in &session.messages {
        content.push_str(&format!(
            "{}:\n{}\n\n",
            speaker_label(message.role),
            message_body(message, "\n")
        ));
    }
    content
}

/// `chat_<sanitized title>.<extension>`
pub fn export_filename(title: &str, extension: &str) -> String {
    format!("chat_{}.{extension}", safe_file_stem(title))
}
