//! In-memory stand-ins for the remote role directory and attachment host.

use async_trait::async_trait;
use serenity::model::id::{EmojiId, GuildId, RoleId, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::attachment::AttachmentSource;
use super::errors::{AttachmentError, DirectoryError};
use super::roles::{EmojiAsset, IconImage, IconPayload, IconRole, RoleCreateSpec, RoleDirectory, RoleEditSpec};

fn icon_hash(image: &IconImage) -> String {
    match image {
        IconImage::Emoji(asset) => format!("emoji-{}", asset.id),
        IconImage::Upload { bytes, .. } => format!("upload-{}", bytes.len()),
    }
}

pub struct FakeDirectory {
    roles: Mutex<Vec<IconRole>>,
    emojis: Mutex<Vec<EmojiAsset>>,
    created: Mutex<Vec<RoleCreateSpec>>,
    assignments: Mutex<Vec<(UserId, RoleId)>>,
    calls: Mutex<Vec<String>>,
    failure: Mutex<Option<DirectoryError>>,
    assign_failure: Mutex<Option<DirectoryError>>,
    create_failure: Mutex<Option<DirectoryError>>,
    next_id: AtomicU64,
}

impl Default for FakeDirectory {
    fn default() -> Self {
        Self {
            roles: Mutex::new(Vec::new()),
            emojis: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            assignments: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            assign_failure: Mutex::new(None),
            create_failure: Mutex::new(None),
            next_id: AtomicU64::new(1000),
        }
    }
}

impl FakeDirectory {
    pub fn add_emoji(&self, id: u64, name: &str) -> EmojiAsset {
        let asset = EmojiAsset {
            id: EmojiId::new(id),
            name: name.to_string(),
            animated: false,
            url: format!("https://cdn.discordapp.com/emojis/{}.png", id),
        };
        self.emojis.lock().unwrap().push(asset.clone());
        asset
    }

    pub fn add_role(&self, name: &str) -> IconRole {
        let role = IconRole {
            id: RoleId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: name.to_string(),
            unicode_emoji: Some("⭐".to_string()),
            icon: None,
        };
        self.roles.lock().unwrap().push(role.clone());
        role
    }

    /// Makes every later create, edit, delete and assignment fail with `error`.
    pub fn fail_with(&self, error: DirectoryError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Makes only the next assignment fail with `error`.
    pub fn fail_next_assign(&self, error: DirectoryError) {
        *self.assign_failure.lock().unwrap() = Some(error);
    }

    /// Makes the next create store the role and still report `error`, like a create whose
    /// follow-up request failed.
    pub fn fail_next_create_after_storing(&self, error: DirectoryError) {
        *self.create_failure.lock().unwrap() = Some(error);
    }

    pub fn roles(&self) -> Vec<IconRole> {
        self.roles.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<RoleCreateSpec> {
        self.created.lock().unwrap().clone()
    }

    pub fn assignments(&self) -> Vec<(UserId, RoleId)> {
        self.assignments.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self) -> Result<(), DirectoryError> {
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RoleDirectory for FakeDirectory {
    async fn find_by_name(&self, _guild_id: GuildId, name: &str) -> Result<Option<IconRole>, DirectoryError> {
        self.record(format!("find_by_name {}", name));
        Ok(self.roles.lock().unwrap().iter().find(|role| role.name == name).cloned())
    }

    async fn create(&self, _guild_id: GuildId, spec: RoleCreateSpec) -> Result<IconRole, DirectoryError> {
        self.record(format!("create {}", spec.name));
        self.check_failure()?;

        let (unicode_emoji, icon) = match &spec.payload {
            IconPayload::Unicode(emoji) => (Some(emoji.clone()), None),
            IconPayload::Image(image) => (None, Some(icon_hash(image))),
        };
        let role = IconRole {
            id: RoleId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: spec.name.clone(),
            unicode_emoji,
            icon,
        };

        self.created.lock().unwrap().push(spec);
        self.roles.lock().unwrap().push(role.clone());
        if let Some(error) = self.create_failure.lock().unwrap().take() {
            return Err(error);
        }
        Ok(role)
    }

    async fn edit(&self, _guild_id: GuildId, role_id: RoleId, spec: RoleEditSpec) -> Result<IconRole, DirectoryError> {
        self.record(format!("edit {}", role_id));
        self.check_failure()?;

        let mut roles = self.roles.lock().unwrap();
        let role = roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| DirectoryError::Rejected("Unknown Role".to_string()))?;
        role.unicode_emoji = spec.unicode_emoji;
        role.icon = spec.image.as_ref().map(icon_hash);
        Ok(role.clone())
    }

    async fn delete(&self, _guild_id: GuildId, role_id: RoleId) -> Result<(), DirectoryError> {
        self.record(format!("delete {}", role_id));
        self.check_failure()?;
        self.roles.lock().unwrap().retain(|role| role.id != role_id);
        Ok(())
    }

    async fn assign_to_member(&self, _guild_id: GuildId, member_id: UserId, role_id: RoleId) -> Result<(), DirectoryError> {
        self.record(format!("assign_to_member {} {}", member_id, role_id));
        self.check_failure()?;
        if let Some(error) = self.assign_failure.lock().unwrap().take() {
            return Err(error);
        }
        self.assignments.lock().unwrap().push((member_id, role_id));
        Ok(())
    }

    async fn resolve_custom_emoji(&self, _guild_id: GuildId, emoji_id: EmojiId) -> Result<Option<EmojiAsset>, DirectoryError> {
        self.record(format!("resolve_custom_emoji {}", emoji_id));
        Ok(self.emojis.lock().unwrap().iter().find(|emoji| emoji.id == emoji_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeAttachments {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeAttachments {
    pub fn insert(&self, url: &str, bytes: Vec<u8>) {
        self.bodies.lock().unwrap().insert(url.to_string(), bytes);
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttachmentSource for FakeAttachments {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, AttachmentError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(AttachmentError::Status(reqwest::StatusCode::NOT_FOUND))
    }
}
