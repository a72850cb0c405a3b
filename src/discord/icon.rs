//! Turns what a member typed or uploaded into a typed icon.
//!
//! Text is tried as a unicode emoji first (only the first grapheme cluster is kept), then as a
//! guild custom emoji token `<:name:id>`. Attachments must declare an image content type and are
//! read fully into memory before they are handed on.

use lazy_static::lazy_static;
use log::{debug, error};
use regex::Regex;
use serenity::model::id::{EmojiId, GuildId};
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use super::attachment::{AttachmentRef, AttachmentSource};
use super::errors::IconRejection;
use super::roles::{EmojiAsset, IconImage, IconPayload, RoleDirectory};

lazy_static! {
    static ref UNICODE_EMOJI: Regex = Regex::new(r"\p{Emoji_Presentation}").unwrap();
    static ref CUSTOM_EMOJI: Regex = Regex::new(r"<:[^:>]+:([0-9]+)>").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSpec {
    UnicodeEmoji(String),
    CustomEmoji(EmojiAsset),
    ImageBytes {
        bytes: Vec<u8>,
        content_type: String,
        filename: String,
    },
}

impl From<IconSpec> for IconPayload {
    fn from(spec: IconSpec) -> Self {
        match spec {
            IconSpec::UnicodeEmoji(emoji) => IconPayload::Unicode(emoji),
            IconSpec::CustomEmoji(asset) => IconPayload::Image(IconImage::Emoji(asset)),
            IconSpec::ImageBytes { bytes, content_type, filename } => IconPayload::Image(IconImage::Upload {
                bytes,
                content_type,
                filename,
            }),
        }
    }
}

/// The leading unicode emoji of `input`, if its first grapheme cluster is one.
pub fn leading_unicode_emoji(input: &str) -> Option<&str> {
    input
        .graphemes(true)
        .next()
        .filter(|grapheme| UNICODE_EMOJI.is_match(grapheme))
}

/// The numeric id inside a `<:name:id>` token, as written.
pub fn custom_emoji_id(input: &str) -> Option<&str> {
    CUSTOM_EMOJI
        .captures(input)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

pub struct IconClassifier {
    directory: Arc<dyn RoleDirectory>,
    attachments: Arc<dyn AttachmentSource>,
}

impl IconClassifier {
    pub fn new(directory: Arc<dyn RoleDirectory>, attachments: Arc<dyn AttachmentSource>) -> Self {
        Self { directory, attachments }
    }

    pub async fn classify_text(&self, guild_id: GuildId, raw: &str) -> Result<IconSpec, IconRejection> {
        let raw = raw.trim();

        if let Some(emoji) = leading_unicode_emoji(raw) {
            debug!("Classified {} as unicode emoji {}", raw, emoji);
            return Ok(IconSpec::UnicodeEmoji(emoji.to_string()));
        }

        let Some(id) = custom_emoji_id(raw) else {
            return Err(IconRejection::InvalidEmoji(raw.to_string()));
        };

        let emoji_id = match id.parse::<u64>() {
            Ok(value) if value != 0 => EmojiId::new(value),
            _ => {
                error!("Custom emoji id {} in {} is not a valid snowflake", id, raw);
                return Err(IconRejection::EmojiNotFound(raw.to_string()));
            }
        };

        match self.directory.resolve_custom_emoji(guild_id, emoji_id).await {
            Ok(Some(asset)) => {
                debug!("Resolved custom emoji {} ({}) in guild {}", asset.name, asset.id, guild_id);
                Ok(IconSpec::CustomEmoji(asset))
            }
            Ok(None) => {
                error!("Custom emoji {} not found in guild {}", emoji_id, guild_id);
                Err(IconRejection::EmojiNotFound(raw.to_string()))
            }
            Err(e) => {
                error!("Error fetching Discord emoji {}: {}", emoji_id, e);
                Err(IconRejection::EmojiNotFound(raw.to_string()))
            }
        }
    }

    pub async fn classify_attachment(&self, attachment: Option<&AttachmentRef>) -> Result<IconSpec, IconRejection> {
        let attachment = attachment.ok_or(IconRejection::NoAttachment)?;

        let content_type = match attachment.content_type.as_deref() {
            Some(content_type) if content_type.contains("image") => content_type,
            _ => {
                error!("Non-image attachment at {}", attachment.url);
                return Err(IconRejection::NonImage);
            }
        };

        let bytes = self.attachments.fetch_bytes(&attachment.url).await.map_err(|e| {
            error!("Error while reading attachment {}: {}", attachment.url, e);
            IconRejection::AttachmentUnreadable
        })?;

        Ok(IconSpec::ImageBytes {
            bytes,
            content_type: content_type.to_string(),
            filename: attachment.filename.clone(),
        })
    }
}
