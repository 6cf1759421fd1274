//! Care calendar command handler
//!
//! Handles: calendar

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandReply, SlashCommandHandler};
use crate::commands::invocation::CommandInvocation;
use crate::features::calendar::render_calendar;

pub struct CalendarHandler;

#[async_trait]
impl SlashCommandHandler for CalendarHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["calendar"]
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[("/calendar", "This month's care tasks for your plants")]
    }

    async fn handle(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        if !invocation.args.is_empty() {
            return Err(anyhow!("/calendar takes no arguments"));
        }
        let tasks = ctx.assistant.generate_calendar().await?;
        Ok(CommandReply::text(render_calendar(&tasks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::testing::test_context;
    use crate::features::weather::{Coordinates, WeatherStatus};

    #[tokio::test]
    async fn test_calendar_renders_grouped_tasks() {
        let (ctx, doubles) = test_context();
        ctx.assistant
            .set_weather(WeatherStatus {
                weather: None,
                coords: Some(Coordinates { lat: 48.1, lon: 11.6 }),
                location_error: None,
            })
            .await;
        doubles.generator.push_ok("Keep the soil moist.");
        ctx.assistant.send_message("Basil").await.unwrap();

        doubles.generator.push_ok(
            r#"```json
[{"plant":"Basil","task":"Pinch off flower buds","timing":"Early in the month"}]
```"#,
        );
        let CommandReply::Text(text) = CalendarHandler
            .handle(ctx.clone(), &CommandInvocation::new("calendar", &[]))
            .await
            .unwrap()
        else {
            panic!("expected text");
        };
        assert!(text.contains("🌱 Basil\n  • [Early in the month] Pinch off flower buds"));
    }

    #[tokio::test]
    async fn test_calendar_without_location() {
        let (ctx, doubles) = test_context();
        let err = CalendarHandler
            .handle(ctx.clone(), &CommandInvocation::new("calendar", &[]))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Location access is required"));
        assert_eq!(doubles.generator.call_count(), 0);
    }
}
