use log::{error, info, warn};
use serenity::model::id::{GuildId, UserId};
use std::sync::Arc;

use super::errors::{DirectoryError, RoleIconFailure};
use super::icon::IconSpec;
use super::roles::{IconPayload, IconRole, RoleCreateSpec, RoleDirectory, RoleEditSpec, LOWEST_RANK_POSITION};

const UPDATE_FAILED: &str = "Unknown error while updating role. Bot owner should check logs.";
const DELETE_FAILED: &str = "Error while deleting role. Bot owner should check logs.";

/// Finds, creates, updates and deletes the per-member icon role.
///
/// The role is identified only by its name, `prefix + member id`, and looked up again on every
/// call. Nothing serializes two requests for the same member: if both miss the lookup, both
/// create a role, and concurrent edits land in whatever order Discord applies them.
pub struct RoleIconResolver {
    directory: Arc<dyn RoleDirectory>,
    prefix: String,
}

impl RoleIconResolver {
    pub fn new(directory: Arc<dyn RoleDirectory>, prefix: impl Into<String>) -> Self {
        Self {
            directory,
            prefix: prefix.into(),
        }
    }

    pub fn role_name(&self, member_id: UserId) -> String {
        format!("{}{}", self.prefix, member_id)
    }

    pub async fn find_role(&self, guild_id: GuildId, member_id: UserId) -> Result<Option<IconRole>, DirectoryError> {
        let role_name = self.role_name(member_id);
        let role = self.directory.find_by_name(guild_id, &role_name).await?;
        if role.is_some() {
            info!("Found role: {}", role_name);
        }
        Ok(role)
    }

    /// Creates the member's icon role, or overwrites the icon on the existing one.
    pub async fn upsert(&self, guild_id: GuildId, member_id: UserId, icon: IconSpec) -> Result<IconRole, RoleIconFailure> {
        let payload = IconPayload::from(icon);

        let result = match self.find_role(guild_id, member_id).await {
            Ok(None) => self.create_for(guild_id, member_id, payload).await,
            Ok(Some(role)) => self.directory.edit(guild_id, role.id, RoleEditSpec::from(payload)).await,
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            error!("Error while creating role for {}: {}", member_id, e);
            match e {
                DirectoryError::Rejected(reason) => RoleIconFailure::Directory(reason),
                DirectoryError::Unavailable(_) => RoleIconFailure::Directory(UPDATE_FAILED.to_string()),
            }
        })
    }

    async fn create_for(&self, guild_id: GuildId, member_id: UserId, payload: IconPayload) -> Result<IconRole, DirectoryError> {
        let spec = RoleCreateSpec {
            name: self.role_name(member_id),
            hoist: false,
            mentionable: false,
            position: LOWEST_RANK_POSITION,
            payload,
        };

        let role = match self.directory.create(guild_id, spec).await {
            Ok(role) => role,
            Err(e) => {
                // A failed create may still have left the role behind on Discord's side.
                if let Ok(Some(orphan)) = self.find_role(guild_id, member_id).await {
                    self.discard(guild_id, &orphan).await;
                }
                return Err(e);
            }
        };

        if let Err(e) = self.directory.assign_to_member(guild_id, member_id, role.id).await {
            self.discard(guild_id, &role).await;
            return Err(e);
        }

        info!("Created role {} for member {}", role.name, member_id);
        Ok(role)
    }

    /// Deletes a role nobody holds, so the next upsert creates and assigns a fresh one.
    async fn discard(&self, guild_id: GuildId, role: &IconRole) {
        match self.directory.delete(guild_id, role.id).await {
            Ok(()) => warn!("Deleted unassigned role {} ({})", role.name, role.id),
            Err(e) => error!("Failed to delete unassigned role {} ({}): {}", role.name, role.id, e),
        }
    }

    /// Deletes the member's icon role. A member without one gets `NoRoleExists`.
    pub async fn remove(&self, guild_id: GuildId, member_id: UserId) -> Result<(), RoleIconFailure> {
        let role = match self.find_role(guild_id, member_id).await {
            Ok(Some(role)) => role,
            Ok(None) => return Err(RoleIconFailure::NoRoleExists),
            Err(e) => {
                error!("Error while finding role for {}: {}", member_id, e);
                return Err(RoleIconFailure::Directory(DELETE_FAILED.to_string()));
            }
        };

        self.directory.delete(guild_id, role.id).await.map_err(|e| {
            error!("Error while deleting role {}: {}", role.name, e);
            RoleIconFailure::Directory(DELETE_FAILED.to_string())
        })
    }
}
