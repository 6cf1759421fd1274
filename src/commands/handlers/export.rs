//! Chat export command handler
//!
//! Handles: export

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandReply, SlashCommandHandler};
use crate::commands::invocation::CommandInvocation;
use crate::features::export::ExportFormat;

pub struct ExportHandler;

#[async_trait]
impl SlashCommandHandler for ExportHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["export"]
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[("/export txt|doc [dir]", "Save the active chat as a transcript or paged document")]
    }

    async fn handle(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        let format: ExportFormat = invocation
            .arg(0)
            .ok_or_else(|| anyhow!("Usage: /export txt|doc [dir]"))?
            .parse()?;
        let dir = invocation
            .rest(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.export_dir.clone());

        let path = ctx.assistant.export_active(format, &dir).await?;
        Ok(CommandReply::text(format!("💾 Saved {}", path.display())))
    }
}
