//! Discord bot: gateway client and slash command dispatch.

pub mod cleanup;
pub mod commands;
pub mod download;
pub mod ocr_command;
pub mod reply;

pub use commands::{CommandRegistry, SlashCommand, default_registry};

use anyhow::{Context as _, Result, anyhow};
use async_trait::async_trait;
use serenity::all::{
    Client, CommandInteraction, Context, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EventHandler,
    GatewayIntents, Interaction, Ready,
};
use std::sync::Arc;

use crate::config::{AppConfig, DISCORD_TOKEN};
use crate::error::SlipError;
use crate::paths::ensure_directories;

struct Handler {
    registry: CommandRegistry,
}

impl Handler {
    async fn dispatch(&self, ctx: &Context, command: &CommandInteraction) -> Result<()> {
        let name = command.data.name.as_str();
        let handler = self
            .registry
            .get(name)
            .ok_or_else(|| SlipError::UnknownCommand(name.to_string()))?;
        handler.execute(ctx, command).await
    }

    /// Generic ephemeral error. A follow-up is used when the interaction was
    /// already acknowledged.
    async fn report_failure(&self, ctx: &Context, command: &CommandInteraction) {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(reply::COMMAND_FAILED)
                .ephemeral(true),
        );
        if command.create_response(&ctx.http, response).await.is_ok() {
            return;
        }

        let followup = CreateInteractionResponseFollowup::new()
            .content(reply::COMMAND_FAILED)
            .ephemeral(true);
        if let Err(e) = command.create_followup(&ctx.http, followup).await {
            tracing::warn!("Could not report failure to user: {}", e);
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("Discord bot is ready, logged in as {}", ready.user.tag());
        tracing::info!("Loaded {} command(s): {:?}", self.registry.len(), self.registry.names());
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        if let Err(e) = self.dispatch(&ctx, &command).await {
            tracing::error!("Error executing /{}: {:#}", command.data.name, e);
            self.report_failure(&ctx, &command).await;
        }
    }
}

/// Connects to the gateway and serves commands until the client stops.
pub async fn run_bot(config: AppConfig) -> Result<()> {
    let token = DISCORD_TOKEN
        .from_env()
        .ok_or_else(|| SlipError::MissingConfig(DISCORD_TOKEN.name.to_string()))?;

    ensure_directories(&config).context("Failed to create working directories")?;

    let registry = default_registry(Arc::new(config));
    if registry.is_empty() {
        return Err(anyhow!("No slash commands registered"));
    }
    for name in registry.names() {
        tracing::info!("Loaded command: {}", name);
    }

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler { registry })
        .await
        .context("Failed to create Discord client")?;

    client.start().await.context("Discord client error")?;
    Ok(())
}
