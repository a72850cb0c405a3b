pub mod config;
pub mod discord;
pub mod logging;

use std::sync::Arc;
use log::{error, info};
use crate::config::Config;
use crate::discord::DiscordClient;

pub struct BotClients {
    pub discord: DiscordClient,
}

pub async fn init(config: Arc<Config>) -> Result<BotClients, Box<dyn std::error::Error + Send + Sync>> {
    if !config.is_discord_configured() {
        return Err("Bot requires a Discord token to be configured.".into());
    }

    info!("Initializing Discord client with role prefix {}...", config.prefix);
    let discord = DiscordClient::new(config).await?;
    info!("Discord client initialized successfully.");

    Ok(BotClients { discord })
}

pub async fn run(clients: BotClients) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Bot is now running. Press Ctrl+C to exit.");

    tokio::select! {
        result = clients.discord.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
                return Err(e.into());
            }
            info!("Discord client has stopped.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down.");
            clients.discord.shutdown().await?;
        }
    }

    info!("Bot has shut down.");
    Ok(())
}
