//! Capabilities the engine needs from a live server.
//!
//! The capture engine only reads through [`WorkspaceAccessor`]; the restore
//! engine additionally mutates through [`WorkspaceMutator`]. Both are handed to
//! the engine per call, so nothing here holds a global session.

use async_trait::async_trait;
use nexus_common::{
    error::NexusResult,
    models::{CategoryAttrs, RoleAttrs, TextChannelAttrs, VoiceChannelAttrs},
    permissions::PermissionOverwrite,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the server an accessor is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub id: Uuid,
    pub name: String,
}

/// A role as the remote server reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRole {
    pub id: Uuid,
    pub name: String,
    pub permissions: u64,
    pub color: i64,
    pub hoist: bool,
    pub mentionable: bool,
    pub position: i64,
    /// The implicit @everyone role (one per server, cannot be deleted)
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCategory {
    pub id: Uuid,
    pub name: String,
    pub position: i64,
    /// Overwrites set directly on this category
    pub overwrites: Vec<PermissionOverwrite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteChannelKind {
    Text {
        topic: Option<String>,
        slow_mode_seconds: i64,
        nsfw: bool,
    },
    Voice {
        user_limit: i64,
        bitrate: i64,
    },
    /// Forum, stage, announcement, thread...
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteChannel {
    pub id: Uuid,
    pub name: String,
    pub position: i64,
    /// Parent category, if any
    pub parent_id: Option<Uuid>,
    pub kind: RemoteChannelKind,
    pub overwrites: Vec<PermissionOverwrite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEmoji {
    pub id: Uuid,
    pub name: String,
    /// Some servers report emojis without an image URL
    pub url: Option<String>,
}

/// Read-only view of a server.
///
/// Listings carry IDs that stay stable for the lifetime of the session.
#[async_trait]
pub trait WorkspaceAccessor: Send + Sync {
    fn workspace(&self) -> &WorkspaceInfo;

    /// Roles in hierarchy order, @everyone included and flagged.
    async fn list_roles(&self) -> NexusResult<Vec<RemoteRole>>;

    async fn list_categories(&self) -> NexusResult<Vec<RemoteCategory>>;

    /// Every non-category channel, whatever its kind.
    async fn list_channels(&self) -> NexusResult<Vec<RemoteChannel>>;

    async fn list_emojis(&self) -> NexusResult<Vec<RemoteEmoji>>;
}

/// Mutating view of a server.
///
/// Every call succeeds or fails on its own; the restore engine never assumes
/// that one failure says anything about the next call.
#[async_trait]
pub trait WorkspaceMutator: WorkspaceAccessor {
    async fn delete_role(&self, role_id: Uuid) -> NexusResult<()>;

    /// Deletes a channel or a category.
    async fn delete_channel(&self, channel_id: Uuid) -> NexusResult<()>;

    /// Creates a role at the top of the hierarchy.
    async fn create_role(&self, attrs: &RoleAttrs) -> NexusResult<Uuid>;

    async fn create_category(&self, attrs: &CategoryAttrs) -> NexusResult<Uuid>;

    async fn create_text_channel(
        &self,
        attrs: &TextChannelAttrs,
        category_id: Option<Uuid>,
    ) -> NexusResult<Uuid>;

    async fn create_voice_channel(
        &self,
        attrs: &VoiceChannelAttrs,
        category_id: Option<Uuid>,
    ) -> NexusResult<Uuid>;

    /// Replaces the overwrites of a channel or category.
    async fn set_overwrites(
        &self,
        channel_id: Uuid,
        overwrites: &[PermissionOverwrite],
    ) -> NexusResult<()>;

    async fn member_exists(&self, user_id: Uuid) -> NexusResult<bool>;
}
