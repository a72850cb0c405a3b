use async_trait::async_trait;
use log::{debug, warn};
use serenity::builder::{CreateAttachment, EditRole};
use serenity::http::Http;
use serenity::model::prelude::*;
use std::sync::Arc;

use super::errors::DirectoryError;

/// Role position sent on creation. The highest ordinal keeps the icon role at the lowest rank.
pub const LOWEST_RANK_POSITION: u16 = u16::MAX;

/// The per-member role that carries an icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRole {
    pub id: RoleId,
    pub name: String,
    pub unicode_emoji: Option<String>,
    /// Image icon hash, if an image icon is set.
    pub icon: Option<String>,
}

impl From<Role> for IconRole {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            unicode_emoji: role.unicode_emoji,
            icon: role.icon.map(|hash| hash.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiAsset {
    pub id: EmojiId,
    pub name: String,
    pub animated: bool,
    pub url: String,
}

impl From<Emoji> for EmojiAsset {
    fn from(emoji: Emoji) -> Self {
        Self {
            url: emoji.url(),
            id: emoji.id,
            name: emoji.name,
            animated: emoji.animated,
        }
    }
}

/// Image data for the role's icon field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconImage {
    /// Guild emoji; the directory turns it into image data.
    Emoji(EmojiAsset),
    Upload {
        bytes: Vec<u8>,
        content_type: String,
        filename: String,
    },
}

/// What gets written to a role. Exactly one icon field is ever set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconPayload {
    Unicode(String),
    Image(IconImage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCreateSpec {
    pub name: String,
    pub hoist: bool,
    pub mentionable: bool,
    pub position: u16,
    pub payload: IconPayload,
}

/// Icon-only edit. A `None` field is sent as an explicit clear, never omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEditSpec {
    pub unicode_emoji: Option<String>,
    pub image: Option<IconImage>,
}

impl From<IconPayload> for RoleEditSpec {
    fn from(payload: IconPayload) -> Self {
        match payload {
            IconPayload::Unicode(emoji) => Self {
                unicode_emoji: Some(emoji),
                image: None,
            },
            IconPayload::Image(image) => Self {
                unicode_emoji: None,
                image: Some(image),
            },
        }
    }
}

/// Guild-scoped role registry on the remote side.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn find_by_name(&self, guild_id: GuildId, name: &str) -> Result<Option<IconRole>, DirectoryError>;

    async fn create(&self, guild_id: GuildId, spec: RoleCreateSpec) -> Result<IconRole, DirectoryError>;

    async fn edit(&self, guild_id: GuildId, role_id: RoleId, spec: RoleEditSpec) -> Result<IconRole, DirectoryError>;

    async fn delete(&self, guild_id: GuildId, role_id: RoleId) -> Result<(), DirectoryError>;

    async fn assign_to_member(&self, guild_id: GuildId, member_id: UserId, role_id: RoleId) -> Result<(), DirectoryError>;

    async fn resolve_custom_emoji(&self, guild_id: GuildId, emoji_id: EmojiId) -> Result<Option<EmojiAsset>, DirectoryError>;
}

/// `RoleDirectory` backed by Discord's HTTP API.
pub struct SerenityRoleDirectory {
    http: Arc<Http>,
}

impl SerenityRoleDirectory {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    async fn attachment_for(&self, image: &IconImage) -> Result<CreateAttachment, DirectoryError> {
        match image {
            IconImage::Emoji(asset) => Ok(CreateAttachment::url(&self.http, &asset.url).await?),
            IconImage::Upload { bytes, filename, .. } => {
                Ok(CreateAttachment::bytes(bytes.clone(), filename.clone()))
            }
        }
    }
}

#[async_trait]
impl RoleDirectory for SerenityRoleDirectory {
    async fn find_by_name(&self, guild_id: GuildId, name: &str) -> Result<Option<IconRole>, DirectoryError> {
        let roles = guild_id.roles(&self.http).await?;
        Ok(roles.into_values().find(|role| role.name == name).map(IconRole::from))
    }

    async fn create(&self, guild_id: GuildId, spec: RoleCreateSpec) -> Result<IconRole, DirectoryError> {
        let builder = EditRole::new()
            .name(spec.name)
            .hoist(spec.hoist)
            .mentionable(spec.mentionable);

        let role = match &spec.payload {
            IconPayload::Unicode(emoji) => {
                guild_id.create_role(&self.http, builder.unicode_emoji(Some(emoji.clone()))).await?
            }
            IconPayload::Image(image) => {
                let attachment = self.attachment_for(image).await?;
                guild_id.create_role(&self.http, builder.icon(Some(&attachment))).await?
            }
        };

        debug!("Created role {} ({}) in guild {}", role.name, role.id, guild_id);

        // Positioned in its own request so a failure here never hides that the role exists.
        if let Err(e) = guild_id.edit_role_position(&self.http, role.id, spec.position).await {
            warn!("Could not move role {} to position {}: {}", role.name, spec.position, e);
        }

        Ok(role.into())
    }

    async fn edit(&self, guild_id: GuildId, role_id: RoleId, spec: RoleEditSpec) -> Result<IconRole, DirectoryError> {
        let attachment = match &spec.image {
            Some(image) => Some(self.attachment_for(image).await?),
            None => None,
        };

        let builder = EditRole::new()
            .unicode_emoji(spec.unicode_emoji)
            .icon(attachment.as_ref());

        let role = guild_id.edit_role(&self.http, role_id, builder).await?;
        debug!("Edited role {} ({}) in guild {}", role.name, role.id, guild_id);
        Ok(role.into())
    }

    async fn delete(&self, guild_id: GuildId, role_id: RoleId) -> Result<(), DirectoryError> {
        guild_id.delete_role(&self.http, role_id).await?;
        Ok(())
    }

    async fn assign_to_member(&self, guild_id: GuildId, member_id: UserId, role_id: RoleId) -> Result<(), DirectoryError> {
        self.http.add_member_role(guild_id, member_id, role_id, None).await?;
        Ok(())
    }

    async fn resolve_custom_emoji(&self, guild_id: GuildId, emoji_id: EmojiId) -> Result<Option<EmojiAsset>, DirectoryError> {
        match guild_id.emoji(&self.http, emoji_id).await {
            Ok(emoji) => Ok(Some(emoji.into())),
            Err(serenity::Error::Http(err)) if err.status_code().map(|code| code.as_u16()) == Some(404) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
