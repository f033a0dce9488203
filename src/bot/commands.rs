//! Slash command trait and registry.

use anyhow::Result;
use async_trait::async_trait;
use serenity::all::{CommandInteraction, Context, CreateCommand};
use std::collections::HashMap;
use std::sync::Arc;

use super::ocr_command::OcrTestCommand;
use crate::config::AppConfig;

/// A slash command the bot can register and execute.
#[async_trait]
pub trait SlashCommand: Send + Sync {
    fn name(&self) -> &'static str;

    /// Definition sent to Discord when commands are deployed.
    fn definition(&self) -> CreateCommand;

    async fn execute(&self, ctx: &Context, command: &CommandInteraction) -> Result<()>;
}

/// Commands by name.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Arc<dyn SlashCommand>>,
}

impl CommandRegistry {
    pub fn register<C: SlashCommand + 'static>(&mut self, command: C) {
        let name = command.name();
        if self.commands.insert(name, Arc::new(command)).is_some() {
            tracing::warn!("Command {} registered twice, keeping the last one", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommand>> {
        self.commands.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Definitions in name order.
    pub fn definitions(&self) -> Vec<CreateCommand> {
        self.names()
            .into_iter()
            .filter_map(|name| self.commands.get(name))
            .map(|command| command.definition())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Every command the bot ships with.
pub fn default_registry(config: Arc<AppConfig>) -> CommandRegistry {
    let mut registry = CommandRegistry::default();
    registry.register(OcrTestCommand::new(config));
    registry
}
