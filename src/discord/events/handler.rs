use serenity::async_trait;
use serenity::model::prelude::*;
use serenity::prelude::*;
use crate::config::Config;
use crate::discord::attachment::AttachmentSource;
use std::sync::Arc;
use log::{debug, error, info, warn};
use crate::discord::commands::role_icon;

pub struct EventHandler {
    config: Arc<Config>,
    attachments: Arc<dyn AttachmentSource>,
}

impl EventHandler {
    pub fn new(config: Arc<Config>, attachments: Arc<dyn AttachmentSource>) -> Self {
        Self { config, attachments }
    }
}

#[async_trait]
impl serenity::client::EventHandler for EventHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let commands = vec![
            role_icon::register(),
        ];

        let guild_id = self.config.discord_guild_id.as_deref().and_then(|id| id.parse::<u64>().ok())
            .filter(|id| *id != 0);
        let result = match guild_id {
            Some(guild_id) => GuildId::new(guild_id).set_commands(&ctx.http, commands).await,
            None => Command::set_global_commands(&ctx.http, commands).await,
        };

        match result {
            Ok(commands) => debug!("Slash commands registered: {:#?}", commands),
            Err(e) => error!("Failed to register slash commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            info!("Received command interaction {} from {}", command.data.name, command.user.id);

            let name = command.data.name.clone();
            let result = match name.as_str() {
                role_icon::CMD_ROLEICON => {
                    role_icon::run(ctx, command, self.attachments.clone(), &self.config.prefix).await
                }
                other => {
                    warn!("Ignoring unregistered command {}", other);
                    Ok(())
                }
            };

            if let Err(why) = result {
                error!("Cannot respond to slash command: {}", why);
            }
        }
    }
}
