//! Weather command handler
//!
//! Handles: weather

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandReply, SlashCommandHandler};
use crate::commands::invocation::CommandInvocation;

pub struct WeatherHandler;

#[async_trait]
impl SlashCommandHandler for WeatherHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["weather"]
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[("/weather [on|off|refresh]", "Show weather, or add it to your next message")]
    }

    async fn handle(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        let assistant = &ctx.assistant;
        match invocation.arg(0) {
            None => {
                let status = assistant.weather().await;
                let context = if assistant.weather_context_enabled().await {
                    "\nYour next message will include the current weather."
                } else {
                    ""
                };
                Ok(CommandReply::text(format!("{}{context}", status.summary())))
            }
            Some("on") => {
                assistant.set_weather_context(true).await?;
                Ok(CommandReply::text("🌦️ Your next message will include the current weather."))
            }
            Some("off") => {
                assistant.set_weather_context(false).await?;
                Ok(CommandReply::text("Weather context is off."))
            }
            Some("refresh") => Ok(CommandReply::text(ctx.refresh_weather().await.summary())),
            Some(other) => Err(anyhow!("Unknown option '{other}'. Usage: /weather [on|off|refresh]")),
        }
    }
}
