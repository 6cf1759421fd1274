//! # Command System
//!
//! Slash command (/) handling for the REPL. Lines without a leading slash
//! are chat messages for the assistant.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: REPL invocations and text replies; add render helpers
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod handler;
pub mod handlers;
pub mod invocation;
pub mod registry;
pub mod render;

// Re-export handler infrastructure
pub use context::CommandContext;
pub use handler::{CommandReply, SlashCommandHandler};
pub use handlers::chat::send_chat;
pub use invocation::{parse_input, CommandInvocation, Input};
pub use registry::CommandRegistry;
