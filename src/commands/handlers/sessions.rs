//! Chat session command handlers
//!
//! Handles: new, chats, select, delete, show

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandReply, SlashCommandHandler};
use crate::commands::invocation::CommandInvocation;
use crate::commands::render::{render_chat_list, render_session};

pub struct SessionsHandler;

#[async_trait]
impl SlashCommandHandler for SessionsHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["new", "chats", "select", "delete", "show"]
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("/new", "Start a new chat"),
            ("/chats", "List chats (▶ marks the active one)"),
            ("/select <n|id>", "Switch to a chat"),
            ("/delete <n|id>", "Delete a chat"),
            ("/show", "Show the active chat"),
        ]
    }

    async fn handle(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        let assistant = &ctx.assistant;
        match invocation.name.as_str() {
            "new" => {
                let id = assistant.new_chat().await;
                info!("Started new chat {id}");
                Ok(CommandReply::text("🌱 Started a new chat."))
            }
            "chats" => Ok(CommandReply::text(render_chat_list(&assistant.sessions().await))),
            "select" => {
                let reference = invocation
                    .arg(0)
                    .ok_or_else(|| anyhow!("Usage: /select <n|id>"))?;
                let session = assistant.select_chat(reference).await?;
                Ok(CommandReply::text(render_session(&session)))
            }
            "delete" => {
                let reference = invocation
                    .arg(0)
                    .ok_or_else(|| anyhow!("Usage: /delete <n|id>"))?;
                let session = assistant.delete_chat(reference).await?;
                Ok(CommandReply::text(format!("🗑️ Deleted \"{}\".", session.title)))
            }
            "show" => match assistant.active_session().await {
                Some(session) => Ok(CommandReply::text(render_session(&session))),
                None => Ok(CommandReply::text("No active chat. Type a message to start one.")),
            },
            other => Err(anyhow!("SessionsHandler cannot handle /{other}")),
        }
    }
}
