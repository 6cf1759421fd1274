//! Notification surface for fired reminders

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl std::str::FromStr for NotificationPermission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "prompt" => Ok(Self::Default),
            "granted" | "enabled" => Ok(Self::Granted),
            "denied" | "disabled" => Ok(Self::Denied),
            other => Err(anyhow::anyhow!(
                "Unknown notification permission '{other}' (use default, granted or denied)"
            )),
        }
    }
}

impl fmt::Display for NotificationPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
        };
        f.write_str(s)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    /// Ask for permission; a denied permission cannot be re-requested
    async fn request_permission(&self) -> NotificationPermission;

    fn show(&self, title: &str, body: &str) -> Result<()>;
}

/// Prints notifications to the terminal with a bell
pub struct TerminalNotifier {
    permission: Mutex<NotificationPermission>,
}

impl TerminalNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission: Mutex::new(permission),
        }
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission.lock().map(|p| *p).unwrap_or_default()
    }

    async fn request_permission(&self) -> NotificationPermission {
        let Ok(mut permission) = self.permission.lock() else {
            return NotificationPermission::Default;
        };
        // Asking from the terminal is the user's consent
        if *permission == NotificationPermission::Default {
            *permission = NotificationPermission::Granted;
            info!("Notification permission granted");
        }
        *permission
    }

    fn show(&self, title: &str, body: &str) -> Result<()> {
        info!("Notification: {title} - {body}");
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\x07🔔 {title}: {body}")?;
        stdout.flush()?;
        Ok(())
    }
}
