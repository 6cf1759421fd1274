//! Watering reminder command handlers
//!
//! Handles: remind, reminders, notify
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Recurring watering reminders with notification permission
//! - 1.0.0: One-shot reminders

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Local;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandReply, SlashCommandHandler};
use crate::commands::invocation::CommandInvocation;
use crate::commands::render::render_reminders;
use crate::features::reminders::{NotificationPermission, MAX_FREQUENCY_DAYS, MIN_FREQUENCY_DAYS};

/// Handler for reminder-related commands
pub struct RemindHandler;

#[async_trait]
impl SlashCommandHandler for RemindHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["remind", "reminders", "notify"]
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("/remind <days> <HH:mm> [plant]", "Water a plant every <days> days at HH:mm"),
            ("/reminders [cancel <id>]", "List or cancel watering reminders"),
            ("/notify", "Turn on reminder notifications"),
        ]
    }

    async fn handle(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        match invocation.name.as_str() {
            "remind" => self.handle_remind(&ctx, invocation).await,
            "reminders" => self.handle_reminders(&ctx, invocation).await,
            "notify" => self.handle_notify(&ctx).await,
            other => Err(anyhow!("RemindHandler cannot handle /{other}")),
        }
    }
}

impl RemindHandler {
    /// Handle /remind - create a recurring reminder
    async fn handle_remind(&self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<CommandReply> {
        const USAGE: &str = "/remind <days> <HH:mm> [plant]";
        let days = invocation
            .arg(0)
            .ok_or_else(|| anyhow!("Usage: {USAGE}"))?
            .parse::<u32>()
            .map_err(|_| {
                anyhow!("Frequency must be a whole number of days ({MIN_FREQUENCY_DAYS}-{MAX_FREQUENCY_DAYS})")
            })?;
        let time = invocation.arg(1).ok_or_else(|| anyhow!("Usage: {USAGE}"))?;
        let plant = invocation.rest(2);

        let reminder = ctx.assistant.save_reminder(plant.as_deref(), days, time).await?;
        let now = ctx.assistant.now().with_timezone(&Local);
        info!("Reminder {} created from the command line", reminder.id);

        Ok(CommandReply::text(format!(
            "⏰ I'll remind you to water your {} every {} day{} at {}. {}.",
            reminder.plant_name,
            reminder.frequency_days,
            if reminder.frequency_days == 1 { "" } else { "s" },
            reminder.reminder_time,
            reminder.due_text(&now)
        )))
    }

    /// Handle /reminders - list, or cancel with `cancel <id>`
    async fn handle_reminders(&self, ctx: &CommandContext, invocation: &CommandInvocation) -> Result<CommandReply> {
        match (invocation.arg(0), invocation.arg(1)) {
            (Some("cancel" | "delete"), Some(id)) => {
                if ctx.assistant.delete_reminder(id).await {
                    Ok(CommandReply::text(format!("🗑️ Cancelled reminder {id}.")))
                } else {
                    Err(anyhow!("No reminder with id {id}"))
                }
            }
            (Some(_), _) => Err(anyhow!("Usage: /reminders [cancel <id>]")),
            (None, _) => {
                let now = ctx.assistant.now().with_timezone(&Local);
                Ok(CommandReply::text(render_reminders(
                    &ctx.assistant.reminders().await,
                    ctx.assistant.notification_permission(),
                    &now,
                )))
            }
        }
    }

    /// Handle /notify - request notification permission
    async fn handle_notify(&self, ctx: &CommandContext) -> Result<CommandReply> {
        let message = match ctx.assistant.request_notification_permission().await {
            NotificationPermission::Granted => "🔔 Notifications are on.",
            NotificationPermission::Denied => {
                "🚫 Notifications are blocked. Set NOTIFICATION_PERMISSION=granted to receive reminders."
            }
            NotificationPermission::Default => "🔕 Notifications are still off.",
        };
        Ok(CommandReply::text(message))
    }
}
