//! Conversation command handlers
//!
//! Handles: upload, edit, feedback. Plain chat lines go through [`send_chat`].

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandReply, SlashCommandHandler};
use crate::commands::invocation::CommandInvocation;
use crate::commands::render::render_message;
use crate::features::sessions::IdentificationFeedback;

const BUSY_MESSAGE: &str = "⏳ Still working on the previous request...";

/// Number the reply will carry in `/show`
async fn last_message_number(ctx: &CommandContext) -> usize {
    ctx.assistant
        .active_session()
        .await
        .map_or(1, |session| session.messages.len())
}

/// Send a plain chat line and render the reply
pub async fn send_chat(ctx: Arc<CommandContext>, text: &str) -> Result<CommandReply> {
    match ctx.assistant.send_message(text).await? {
        Some(reply) => Ok(CommandReply::text(render_message(
            last_message_number(&ctx).await,
            &reply,
        ))),
        None if ctx.assistant.is_loading() => Ok(CommandReply::text(BUSY_MESSAGE)),
        None => Ok(CommandReply::text("")),
    }
}

/// Parse a 1-based message number into an index
fn message_index(value: Option<&str>, usage: &str) -> Result<usize> {
    value
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n - 1)
        .ok_or_else(|| anyhow!("Usage: {usage}"))
}

pub struct ChatHandler;

#[async_trait]
impl SlashCommandHandler for ChatHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["upload", "edit", "feedback"]
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("<message>", "Ask about your plants"),
            ("/upload <path>", "Identify the plant in a photo"),
            ("/edit <n> <text>", "Rewrite your message n and regenerate the answer"),
            ("/feedback <n> correct|incorrect [name]", "Confirm or correct identification n"),
        ]
    }

    async fn handle(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        match invocation.name.as_str() {
            "upload" => self.handle_upload(&ctx, invocation).await,
            "edit" => self.handle_edit(&ctx, invocation).await,
            "feedback" => self.handle_feedback(&ctx, invocation).await,
            other => Err(anyhow!("ChatHandler cannot handle /{other}")),
        }
    }
}

impl ChatHandler {
    async fn handle_upload(&self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<CommandReply> {
        let path = invocation
            .rest(0)
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("Usage: /upload <path to photo>"))?;

        match ctx.assistant.upload_image(&path).await? {
            Some(reply) => Ok(CommandReply::text(render_message(last_message_number(ctx).await, &reply))),
            None => Ok(CommandReply::text(BUSY_MESSAGE)),
        }
    }

    async fn handle_edit(&self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<CommandReply> {
        const USAGE: &str = "/edit <message number> <new text>";
        let index = message_index(invocation.arg(0), USAGE)?;
        let text = invocation.rest(1).ok_or_else(|| anyhow!("Usage: {USAGE}"))?;

        match ctx.assistant.save_edit(index, &text).await? {
            Some(reply) => Ok(CommandReply::text(render_message(last_message_number(ctx).await, &reply))),
            None => Ok(CommandReply::text(BUSY_MESSAGE)),
        }
    }

    async fn handle_feedback(&self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<CommandReply> {
        const USAGE: &str = "/feedback <message number> correct|incorrect [correct name]";
        let index = message_index(invocation.arg(0), USAGE)?;
        let feedback: IdentificationFeedback = invocation
            .arg(1)
            .ok_or_else(|| anyhow!("Usage: {USAGE}"))?
            .parse()?;
        let corrected_name = invocation.rest(2);

        let followup = ctx
            .assistant
            .identification_feedback(index, feedback, corrected_name)
            .await?;
        Ok(CommandReply::text(followup.unwrap_or_else(|| {
            "Thanks for letting me know. What is the plant actually called? Try /feedback <n> incorrect <name>."
                .to_string()
        })))
    }
}
