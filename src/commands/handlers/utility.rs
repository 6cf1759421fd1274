//! Utility command handlers
//!
//! Handles: help, quit, exit
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Help text is assembled from every handler's usage lines
//! - 1.0.0: Extracted from the REPL loop

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandReply, SlashCommandHandler};
use crate::commands::invocation::CommandInvocation;

/// Handler for utility commands: help, quit, exit
pub struct UtilityHandler;

#[async_trait]
impl SlashCommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["help", "quit", "exit"]
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[("/help", "Show this help message"), ("/quit", "Leave Verdant")]
    }

    async fn handle(&self, _ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        match invocation.name.as_str() {
            "quit" | "exit" => {
                info!("Quit requested");
                Ok(CommandReply::Quit)
            }
            _ => Ok(CommandReply::text(help_text())),
        }
    }
}

fn help_text() -> String {
    let lines = super::help_lines();
    let width = lines.iter().map(|(usage, _)| usage.chars().count()).max().unwrap_or(0);

    let mut text = String::from("Available commands:\n");
    for (usage, description) in lines {
        let pad = width - usage.chars().count();
        text.push_str(&format!("  {usage}{}  {description}\n", " ".repeat(pad)));
    }
    text.push_str("\nAnything that does not start with / is sent to the assistant.");
    text
}
