//! # Content Generator Feature
//!
//! Single outbound text/vision generation call plus the plant-identification
//! prompt and its best-effort JSON parsing. Failures never reach the session:
//! callers go through `generate_or_fallback`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod client;
pub mod identification;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    generate_or_fallback, ContentGenerator, GeminiClient, ImagePart, FALLBACK_MESSAGE,
    REGENERATE_FALLBACK_MESSAGE,
};
pub use identification::{parse_identification, IDENTIFICATION_PROMPT, UPLOAD_CAPTION};
