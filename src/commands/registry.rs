//! Command handler registry
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add `dispatch`
//! - 1.0.0: Initial implementation for handler dispatch

use anyhow::{bail, Result};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::context::CommandContext;
use super::handler::{CommandReply, SlashCommandHandler};
use super::invocation::CommandInvocation;

/// Registry mapping command names to handlers
///
/// Multiple command names can map to the same handler if they share logic.
///
/// # Example
///
/// ```ignore
/// let mut registry = CommandRegistry::new();
/// registry.register(Arc::new(UtilityHandler));
///
/// let reply = registry.dispatch(ctx, &invocation).await?;
/// ```
#[derive(Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with every built-in handler
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        for handler in super::handlers::create_all_handlers() {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler for its declared command names
    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    /// Get handler for a command name
    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names
    ///
    /// A handler registered for multiple names is counted once per name.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn command_names(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }

    /// Route an invocation to its handler
    pub async fn dispatch(&self, ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
        let Some(handler) = self.get(&invocation.name) else {
            bail!(
                "Unknown command /{}. Type /help for a list of commands.",
                invocation.name
            );
        };
        debug!("Dispatching /{} with {} arg(s)", invocation.name, invocation.args.len());
        handler.handle(ctx, invocation).await
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::testing::test_context;
    use async_trait::async_trait;

    struct MockHandler {
        names: &'static [&'static str],
    }

    #[async_trait]
    impl SlashCommandHandler for MockHandler {
        fn command_names(&self) -> &'static [&'static str] {
            self.names
        }

        async fn handle(&self, _ctx: Arc<CommandContext>, invocation: &CommandInvocation) -> Result<CommandReply> {
            Ok(CommandReply::text(format!("handled {}", invocation.name)))
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(CommandRegistry::default().is_empty());
    }

    #[test]
    fn test_registry_register_multiple_names() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler {
            names: &["remind", "reminders", "notify"],
        }));

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("remind"));
        assert!(registry.contains("notify"));
        assert!(!registry.contains("calendar"));
        assert!(registry.get("reminders").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_default_handlers_cover_every_command() {
        let registry = CommandRegistry::with_default_handlers();
        for name in [
            "help", "quit", "new", "chats", "select", "delete", "show", "upload", "edit", "feedback",
            "weather", "remind", "reminders", "notify", "calendar", "garden", "export",
        ] {
            assert!(registry.contains(name), "/{name} is not registered");
        }
    }

    #[tokio::test]
    async fn test_dispatch() {
        let (ctx, _) = test_context();
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler { names: &["ping"] }));

        let reply = registry
            .dispatch(ctx.clone(), &CommandInvocation::new("ping", &[]))
            .await
            .unwrap();
        assert_eq!(reply, CommandReply::text("handled ping"));

        let err = registry
            .dispatch(ctx, &CommandInvocation::new("pong", &[]))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Unknown command /pong"));
    }
}
