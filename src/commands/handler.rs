//! Command handler trait
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Handlers take a parsed REPL invocation and return a reply
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::context::CommandContext;
use super::invocation::CommandInvocation;

/// What the REPL should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Text(String),
    Quit,
}

impl CommandReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Trait for slash command handlers
///
/// Each handler processes one or more commands and is registered with a
/// [`CommandRegistry`](super::registry::CommandRegistry) under every name it declares.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl SlashCommandHandler for PingHandler {
///     fn command_names(&self) -> &'static [&'static str] {
///         &["ping"]
///     }
///
///     async fn handle(
///         &self,
///         ctx: Arc<CommandContext>,
///         invocation: &CommandInvocation,
///     ) -> Result<CommandReply> {
///         Ok(CommandReply::text("Pong!"))
///     }
/// }
/// ```
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Command name(s) this handler processes
    fn command_names(&self) -> &'static [&'static str];

    /// `(usage, description)` lines for `/help`
    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Handle the command
    ///
    /// Errors are shown to the user and never end the session.
    async fn handle(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply>;
}
