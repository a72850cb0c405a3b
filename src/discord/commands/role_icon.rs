// src/discord/commands/role_icon.rs

use futures::FutureExt;
use log::{debug, error, info};
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use serenity::model::prelude::*;
use serenity::prelude::*;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::discord::attachment::{AttachmentRef, AttachmentSource};
use crate::discord::errors::RoleIconError;
use crate::discord::icon::IconClassifier;
use crate::discord::resolver::RoleIconResolver;
use crate::discord::roles::{RoleDirectory, SerenityRoleDirectory};

pub const CMD_ROLEICON: &str = "roleicon";
const SUBCMD_SET_EMOJI: &str = "emoji";
const SUBCMD_SET_OPT_EMOJI: &str = "emoji";
const SUBCMD_SET_IMAGE: &str = "image";
const SUBCMD_SET_OPT_IMAGE: &str = "image";
const SUBCMD_CLEAR: &str = "clear";

const SET_FAILED: &str = "Unknown error while setting icon. Bot owner should check logs.";
const CLEAR_FAILED: &str = "Unknown error while clearing role. Bot owner should check logs.";

const COLOR_SUCCESS: u32 = 0x00FF00;
const COLOR_ERROR: u32 = 0xFF0000;

pub fn register() -> CreateCommand {
    CreateCommand::new(CMD_ROLEICON)
        .description("Sets or removes your role icon.")
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, SUBCMD_SET_EMOJI, "Sets your role icon with an emoji.")
                .add_sub_option(
                    CreateCommandOption::new(CommandOptionType::String, SUBCMD_SET_OPT_EMOJI, "Emoji to use as your role icon.")
                        .required(true),
                ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                SUBCMD_SET_IMAGE,
                "Sets your role icon with an image you upload.",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Attachment, SUBCMD_SET_OPT_IMAGE, "Image to use as your role icon")
                    .required(true),
            ),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            SUBCMD_CLEAR,
            "Clears your role icon.",
        ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleIconRequest {
    SetEmoji(String),
    SetImage(Option<AttachmentRef>),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleIconInvocation {
    pub guild_id: Option<GuildId>,
    pub member_id: UserId,
    pub request: RoleIconRequest,
}

impl RoleIconInvocation {
    /// Reads the subcommand and its option. Subcommands this bot never registered yield `None`.
    pub fn from_interaction(command: &CommandInteraction) -> Option<Self> {
        let (subcommand, options) = command.data.options().into_iter().find_map(|option| match option.value {
            ResolvedValue::SubCommand(options) => Some((option.name, options)),
            _ => None,
        })?;

        let request = match subcommand {
            SUBCMD_SET_EMOJI => {
                let emoji = options.iter().find_map(|option| match option.value {
                    ResolvedValue::String(value) if option.name == SUBCMD_SET_OPT_EMOJI => Some(value.to_string()),
                    _ => None,
                });
                RoleIconRequest::SetEmoji(emoji.unwrap_or_default())
            }
            SUBCMD_SET_IMAGE => RoleIconRequest::SetImage(options.iter().find_map(|option| match option.value {
                ResolvedValue::Attachment(attachment) if option.name == SUBCMD_SET_OPT_IMAGE => {
                    Some(AttachmentRef::from(attachment))
                }
                _ => None,
            })),
            SUBCMD_CLEAR => RoleIconRequest::Clear,
            _ => return None,
        };

        Some(Self {
            guild_id: command.guild_id,
            member_id: command.user.id,
            request,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Success,
    Error,
}

/// The single ephemeral embed sent back for an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub description: String,
}

impl Reply {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Success,
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Error,
            description: description.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            ReplyKind::Success => "Success",
            ReplyKind::Error => "Error",
        }
    }

    pub fn color(&self) -> u32 {
        match self.kind {
            ReplyKind::Success => COLOR_SUCCESS,
            ReplyKind::Error => COLOR_ERROR,
        }
    }

    pub fn into_response(self) -> CreateInteractionResponse {
        let embed = CreateEmbed::new()
            .title(self.title())
            .description(self.description.clone())
            .color(self.color());

        CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().embed(embed).ephemeral(true))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs one `/roleicon` invocation from raw input to reply.
pub struct RoleIconDispatcher {
    classifier: IconClassifier,
    resolver: RoleIconResolver,
}

impl RoleIconDispatcher {
    pub fn new(directory: Arc<dyn RoleDirectory>, attachments: Arc<dyn AttachmentSource>, prefix: &str) -> Self {
        Self {
            classifier: IconClassifier::new(directory.clone(), attachments),
            resolver: RoleIconResolver::new(directory, prefix),
        }
    }

    /// Always produces a reply; handler errors and panics become a generic error message.
    pub async fn handle(&self, invocation: &RoleIconInvocation) -> Reply {
        let fallback = match invocation.request {
            RoleIconRequest::Clear => CLEAR_FAILED,
            _ => SET_FAILED,
        };

        let result = AssertUnwindSafe(self.route(invocation))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(RoleIconError::Panicked(panic_message(panic))));

        match result {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error handling {:?} for member {}: {}", invocation.request, invocation.member_id, e);
                Reply::error(fallback)
            }
        }
    }

    async fn route(&self, invocation: &RoleIconInvocation) -> Result<Reply, RoleIconError> {
        let guild_id = invocation.guild_id.ok_or(RoleIconError::MissingGuild)?;
        let member_id = invocation.member_id;

        match &invocation.request {
            RoleIconRequest::SetEmoji(raw) => self.handle_set_emoji(guild_id, member_id, raw).await,
            RoleIconRequest::SetImage(attachment) => self.handle_set_image(guild_id, member_id, attachment.as_ref()).await,
            RoleIconRequest::Clear => self.handle_clear(guild_id, member_id).await,
        }
    }

    async fn handle_set_emoji(&self, guild_id: GuildId, member_id: UserId, raw: &str) -> Result<Reply, RoleIconError> {
        let raw = raw.trim();
        info!("handle_set_emoji() with emoji string {} from member {}", raw, member_id);

        let icon = match self.classifier.classify_text(guild_id, raw).await {
            Ok(icon) => icon,
            Err(rejection) => return Ok(Reply::error(rejection.to_string())),
        };

        if let Err(failure) = self.resolver.upsert(guild_id, member_id, icon).await {
            return Ok(Reply::error(failure.to_string()));
        }

        info!("handle_set_emoji() success for {}", member_id);
        Ok(Reply::success(format!("Set {}'s role icon to {}.", member_id.mention(), raw)))
    }

    async fn handle_set_image(
        &self,
        guild_id: GuildId,
        member_id: UserId,
        attachment: Option<&AttachmentRef>,
    ) -> Result<Reply, RoleIconError> {
        match attachment {
            Some(attachment) => info!("handle_set_image() from member {} with attachment URL {}", member_id, attachment.url),
            None => error!("handle_set_image(): empty attachment for {}", member_id),
        }

        let icon = match self.classifier.classify_attachment(attachment).await {
            Ok(icon) => icon,
            Err(rejection) => return Ok(Reply::error(rejection.to_string())),
        };

        if let Err(failure) = self.resolver.upsert(guild_id, member_id, icon).await {
            return Ok(Reply::error(failure.to_string()));
        }

        info!("handle_set_image() success for {}", member_id);
        let url = attachment.map(|attachment| attachment.url.as_str()).unwrap_or_default();
        Ok(Reply::success(format!("Set {}'s role icon to {}.", member_id.mention(), url)))
    }

    async fn handle_clear(&self, guild_id: GuildId, member_id: UserId) -> Result<Reply, RoleIconError> {
        info!("Got clear subcommand from member {}", member_id);

        if let Err(failure) = self.resolver.remove(guild_id, member_id).await {
            return Ok(Reply::error(format!("Failed to delete role: {}", failure)));
        }

        info!("handle_clear() success for {}", member_id);
        Ok(Reply::success(format!("Cleared icon role for {}.", member_id.mention())))
    }
}

pub async fn run(
    ctx: Context,
    command: CommandInteraction,
    attachments: Arc<dyn AttachmentSource>,
    prefix: &str,
) -> Result<(), serenity::Error> {
    let Some(invocation) = RoleIconInvocation::from_interaction(&command) else {
        return Ok(());
    };

    let directory = Arc::new(SerenityRoleDirectory::new(ctx.http.clone()));
    let dispatcher = RoleIconDispatcher::new(directory, attachments, prefix);
    let reply = dispatcher.handle(&invocation).await;
    debug!("Replying to {} with {}: {}", invocation.member_id, reply.title(), reply.description);

    command.create_response(&ctx.http, reply.into_response()).await
}
