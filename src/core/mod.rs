//! # Core Module
//!
//! Configuration, clock abstraction and text helpers shared by every feature.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add clock module for injectable time
//! - 1.0.0: Initial creation with config and text modules

pub mod clock;
pub mod config;
pub mod text;

// Re-export commonly used items
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use text::{safe_file_stem, strip_json_fence, strip_markdown, truncate_title, wrap_text};
