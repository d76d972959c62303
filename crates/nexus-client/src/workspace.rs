//! A live Nexus server seen through its REST API.

use async_trait::async_trait;
use nexus_backup::{
    RemoteCategory, RemoteChannel, RemoteEmoji, RemoteRole, WorkspaceAccessor, WorkspaceInfo,
    WorkspaceMutator,
};
use nexus_common::{
    error::{NexusError, NexusResult},
    models::{CategoryAttrs, RoleAttrs, TextChannelAttrs, VoiceChannelAttrs},
    permissions::PermissionOverwrite,
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::rest::RestClient;
use crate::types::{
    ChannelWire, CreateChannelBody, CreateRoleBody, Created, EmojiWire, Listed, OverwritesBody,
    RoleWire, ServerWire,
};

/// One server on a Nexus instance.
pub struct RemoteWorkspace {
    rest: RestClient,
    info: WorkspaceInfo,
}

impl RemoteWorkspace {
    /// Look the server up once and bind to it.
    pub async fn connect(rest: RestClient, server_id: Uuid) -> NexusResult<Self> {
        let server: ServerWire = rest.get(&format!("/servers/{server_id}")).await?;
        info!(server_id = %server.id, name = %server.name, "connected to server");
        Ok(Self {
            rest,
            info: server.into(),
        })
    }

    fn server_path(&self, suffix: &str) -> String {
        format!("/servers/{}{suffix}", self.info.id)
    }

    async fn listed(&self) -> NexusResult<Vec<Listed>> {
        let channels: Vec<ChannelWire> = self.rest.get(&self.server_path("/channels")).await?;
        Ok(channels.into_iter().map(Listed::from).collect())
    }

    async fn create_channel(&self, body: &CreateChannelBody<'_>) -> NexusResult<Uuid> {
        let created: Created = self.rest.post(&self.server_path("/channels"), body).await?;
        Ok(created.id)
    }
}

#[async_trait]
impl WorkspaceAccessor for RemoteWorkspace {
    fn workspace(&self) -> &WorkspaceInfo {
        &self.info
    }

    async fn list_roles(&self) -> NexusResult<Vec<RemoteRole>> {
        let roles: Vec<RoleWire> = self.rest.get(&self.server_path("/roles")).await?;
        let mut roles: Vec<RemoteRole> = roles.into_iter().map(RemoteRole::from).collect();
        roles.sort_by(|a, b| b.is_default.cmp(&a.is_default).then(b.position.cmp(&a.position)));
        Ok(roles)
    }

    async fn list_categories(&self) -> NexusResult<Vec<RemoteCategory>> {
        Ok(self
            .listed()
            .await?
            .into_iter()
            .filter_map(|l| match l {
                Listed::Category(c) => Some(c),
                Listed::Channel(_) => None,
            })
            .collect())
    }

    async fn list_channels(&self) -> NexusResult<Vec<RemoteChannel>> {
        Ok(self
            .listed()
            .await?
            .into_iter()
            .filter_map(|l| match l {
                Listed::Channel(c) => Some(c),
                Listed::Category(_) => None,
            })
            .collect())
    }

    async fn list_emojis(&self) -> NexusResult<Vec<RemoteEmoji>> {
        let emojis: Vec<EmojiWire> = self.rest.get(&self.server_path("/emojis")).await?;
        Ok(emojis.into_iter().map(RemoteEmoji::from).collect())
    }
}

#[async_trait]
impl WorkspaceMutator for RemoteWorkspace {
    async fn delete_role(&self, role_id: Uuid) -> NexusResult<()> {
        self.rest.delete(&self.server_path(&format!("/roles/{role_id}"))).await
    }

    async fn delete_channel(&self, channel_id: Uuid) -> NexusResult<()> {
        self.rest.delete(&format!("/channels/{channel_id}")).await
    }

    async fn create_role(&self, attrs: &RoleAttrs) -> NexusResult<Uuid> {
        let created: Created = self
            .rest
            .post(&self.server_path("/roles"), &CreateRoleBody::from(attrs))
            .await?;
        Ok(created.id)
    }

    async fn create_category(&self, attrs: &CategoryAttrs) -> NexusResult<Uuid> {
        self.create_channel(&CreateChannelBody::category(attrs)).await
    }

    async fn create_text_channel(
        &self,
        attrs: &TextChannelAttrs,
        category_id: Option<Uuid>,
    ) -> NexusResult<Uuid> {
        self.create_channel(&CreateChannelBody::text(attrs, category_id)).await
    }

    async fn create_voice_channel(
        &self,
        attrs: &VoiceChannelAttrs,
        category_id: Option<Uuid>,
    ) -> NexusResult<Uuid> {
        self.create_channel(&CreateChannelBody::voice(attrs, category_id)).await
    }

    async fn set_overwrites(
        &self,
        channel_id: Uuid,
        overwrites: &[PermissionOverwrite],
    ) -> NexusResult<()> {
        self.rest
            .patch(
                &format!("/channels/{channel_id}"),
                &OverwritesBody {
                    permission_overwrites: overwrites,
                },
            )
            .await
    }

    async fn member_exists(&self, user_id: Uuid) -> NexusResult<bool> {
        match self
            .rest
            .get::<Value>(&self.server_path(&format!("/members/{user_id}")))
            .await
        {
            Ok(_) => Ok(true),
            Err(NexusError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
