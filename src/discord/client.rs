// src/discord/client.rs

use serenity::prelude::*;
use crate::config::Config;
use crate::discord::attachment::ReqwestAttachmentSource;
use std::sync::Arc;
use std::time::Duration;
use log::{info, warn};
use tokio::sync::Mutex;

use super::events::EventHandler;

pub struct DiscordClient {
    client: Arc<Mutex<Option<Client>>>,
    shard_manager: Arc<serenity::gateway::ShardManager>,
}

impl DiscordClient {
    pub async fn new(config: Arc<Config>) -> Result<Self, serenity::Error> {
        let token = config.discord_token.clone().ok_or_else(|| {
            serenity::Error::Other("Discord token not found in configuration")
        })?;

        // Slash commands and role edits only need guild data; no privileged intents.
        let intents = GatewayIntents::GUILDS;

        let attachments = Arc::new(ReqwestAttachmentSource::new(reqwest::Client::new()));
        let client = Client::builder(&token, intents)
            .event_handler(EventHandler::new(config.clone(), attachments))
            .await?;

        let shard_manager = client.shard_manager.clone();

        Ok(Self {
            client: Arc::new(Mutex::new(Some(client))),
            shard_manager,
        })
    }

    pub async fn shutdown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Shutting down DiscordClient...");
        match tokio::time::timeout(Duration::from_secs(10), self.shard_manager.shutdown_all()).await {
            Ok(_) => info!("Discord shards shut down successfully"),
            Err(_) => warn!("Timed out while shutting down Discord shards"),
        }
        info!("DiscordClient shutdown complete.");
        Ok(())
    }

    /// Runs the gateway connection until the shards stop.
    pub async fn start(&self) -> Result<(), serenity::Error> {
        let client = self.client.lock().await.take();
        match client {
            Some(mut client) => client.start().await,
            None => Err(serenity::Error::Other("Discord client has already been started")),
        }
    }
}
