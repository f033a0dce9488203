//! `deploy-commands`: registers the bot's slash commands for one guild.

use anyhow::Result;
use serenity::all::{ApplicationId, GuildId, Http};
use std::sync::Arc;

use crate::bot::default_registry;
use crate::config::{AppConfig, Credentials};

pub async fn deploy_commands(config: &AppConfig) -> Result<()> {
    let credentials = Credentials::from_env()?;

    let registry = default_registry(Arc::new(config.clone()));
    for name in registry.names() {
        println!("✅ Loaded command: {}", name);
    }
    let definitions = registry.definitions();

    let http = Http::new(&credentials.token);
    http.set_application_id(ApplicationId::new(credentials.client_id));

    println!(
        "🚀 Started refreshing {} application (/) commands.",
        definitions.len()
    );

    match GuildId::new(credentials.guild_id)
        .set_commands(&http, definitions)
        .await
    {
        Ok(deployed) => {
            println!(
                "✅ Successfully reloaded {} application (/) commands for guild.",
                deployed.len()
            );
            println!("Commands deployed:");
            for command in deployed {
                println!("  • /{}", command.name);
            }
        }
        Err(e) => {
            tracing::error!("Error deploying commands: {}", e);
            println!("❌ Error deploying commands: {}", e);
        }
    }

    Ok(())
}
