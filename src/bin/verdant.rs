use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use verdant::assistant::Assistant;
use verdant::commands::{parse_input, send_chat, CommandContext, CommandRegistry, CommandReply, Input};
use verdant::core::{Config, SystemClock};
use verdant::database::Database;
use verdant::features::generator::GeminiClient;
use verdant::features::reminders::{ReminderScheduler, TerminalNotifier};
use verdant::features::weather::WeatherClient;

const BANNER: &str = "🌿 Verdant - your plant care assistant. Type /help for commands.";

async fn prompt(stdout: &mut tokio::io::Stdout) -> Result<()> {
    stdout.write_all(b"\n> ").await?;
    stdout.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::load()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Verdant...");

    let ephemeral = std::env::args().skip(1).any(|arg| arg == "--ephemeral");
    let database = if ephemeral {
        info!("Running with an in-memory store; nothing will be saved");
        Database::in_memory()?
    } else {
        Database::new(&config.database_path)?
    };

    let generator = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
    ));
    let notifier = Arc::new(TerminalNotifier::new(config.notification_permission));
    let assistant = Arc::new(Assistant::load(generator, database, notifier, Arc::new(SystemClock)));

    let ctx = Arc::new(CommandContext::new(
        assistant.clone(),
        WeatherClient::new(&config.weather_base_url),
        config.coordinates(),
        PathBuf::from(&config.export_dir),
    ));
    let registry = CommandRegistry::with_default_handlers();

    println!("{BANNER}");
    println!("{}", ctx.refresh_weather().await.summary());

    tokio::spawn(ReminderScheduler::new(assistant.clone()).run());

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&mut stdout).await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_input(&line) {
            Input::Empty => {
                prompt(&mut stdout).await?;
                continue;
            }
            Input::Chat(text) => send_chat(ctx.clone(), &text).await,
            Input::Command(invocation) => registry.dispatch(ctx.clone(), &invocation).await,
        };

        match reply {
            Ok(CommandReply::Quit) => break,
            Ok(CommandReply::Text(text)) if text.is_empty() => {}
            Ok(CommandReply::Text(text)) => println!("{text}"),
            Err(e) => {
                debug!("Command failed: {e:#}");
                println!("❌ {e}");
            }
        }
        prompt(&mut stdout).await?;
    }

    info!("Goodbye");
    println!("🌱 Goodbye!");
    Ok(())
}
