//! # Sessions Feature
//!
//! Chat sessions, tagged message content and the active-session store.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod model;
pub mod store;

pub use model::{
    clamp_confidence, is_placeholder_title, ChatMessage, ChatSession, IdentificationFeedback, ImageAttachment,
    MessageContent, PlantIdentification, Role, NEW_CHAT_TITLE, PLANT_ANALYSIS_TITLE,
};
pub use store::SessionStore;
