//! Chat session and message types
//!
//! Message content is a sum type persisted untagged: a JSON string for text,
//! an object with `promptText`/`imageUrl` for image uploads, and an object
//! with `plantName`/`confidence`/`careInstructions` for identifications.

use serde::{Deserialize, Deserializer, Serialize};

/// Title of an explicitly created, still-empty chat
pub const NEW_CHAT_TITLE: &str = "New Chat";
/// Title of a chat started by an image upload, until identification succeeds
pub const PLANT_ANALYSIS_TITLE: &str = "Plant Analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentificationFeedback {
    Correct,
    Incorrect,
}

impl std::str::FromStr for IdentificationFeedback {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "correct" | "yes" => Ok(Self::Correct),
            "incorrect" | "no" | "wrong" => Ok(Self::Incorrect),
            other => Err(anyhow::anyhow!("Unknown feedback '{other}' (use correct or incorrect)")),
        }
    }
}

/// Round a model-reported confidence to a whole percentage in `0..=100`
pub fn clamp_confidence(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Accepts any JSON number; stored histories may carry fractional confidences
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_confidence)
}

/// Structured identification produced by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantIdentification {
    pub plant_name: String,
    /// Percentage, 0-100
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
    /// Markdown
    pub care_instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<IdentificationFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_name: Option<String>,
}

/// User-uploaded image with its caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub prompt_text: String,
    /// `data:<mime>;base64,<payload>`
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Identification(PlantIdentification),
    Image(ImageAttachment),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_image(prompt_text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Image(ImageAttachment {
                prompt_text: prompt_text.into(),
                image_url: image_url.into(),
            }),
        }
    }

    pub fn identification(identification: PlantIdentification) -> Self {
        Self {
            role: Role::Model,
            content: MessageContent::Identification(identification),
        }
    }

    /// Only user-authored plain text can be edited
    pub fn is_editable(&self) -> bool {
        self.role == Role::User && matches!(self.content, MessageContent::Text(_))
    }

    pub fn as_identification(&self) -> Option<&PlantIdentification> {
        match (&self.role, &self.content) {
            (Role::Model, MessageContent::Identification(id)) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the title still names a placeholder rather than a plant
    pub fn has_placeholder_title(&self) -> bool {
        is_placeholder_title(&self.title)
    }
}

pub fn is_placeholder_title(title: &str) -> bool {
    title.is_empty() || title == NEW_CHAT_TITLE || title == PLANT_ANALYSIS_TITLE
}
