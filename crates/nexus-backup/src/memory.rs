//! In-memory server used to exercise the engine without a network.
//!
//! Behaves like a Nexus server for the calls the engine makes: roles are
//! listed with @everyone first and the rest by descending position, new roles
//! land at the top, and every created object gets a fresh ID. Failures can be
//! injected per operation and per object name, and every mutating call is
//! logged so tests can assert on what was attempted.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use nexus_common::{
    error::{NexusError, NexusResult},
    models::{CategoryAttrs, RoleAttrs, TextChannelAttrs, VoiceChannelAttrs},
    permissions::{PermissionOverwrite, Permissions},
    ids,
};
use uuid::Uuid;

use crate::workspace::{
    RemoteCategory, RemoteChannel, RemoteChannelKind, RemoteEmoji, RemoteRole, WorkspaceAccessor,
    WorkspaceInfo, WorkspaceMutator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListRoles,
    ListCategories,
    ListChannels,
    ListEmojis,
    DeleteRole,
    DeleteChannel,
    CreateRole,
    CreateCategory,
    CreateChannel,
    SetOverwrites,
    MemberExists,
}

/// A mutating call, recorded whether or not it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    DeleteRole(Uuid),
    DeleteChannel(Uuid),
    CreateRole(String),
    CreateCategory(String),
    CreateChannel(String),
    SetOverwrites(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaultKind {
    Unauthorized,
    Invalid,
    Unavailable,
}

#[derive(Debug, Clone)]
struct Fault {
    op: Operation,
    /// `None` matches every object
    name: Option<String>,
    kind: FaultKind,
}

#[derive(Debug, Clone)]
enum Slot {
    Category,
    Channel(RemoteChannelKind),
}

#[derive(Debug, Clone)]
struct MemoryChannel {
    id: Uuid,
    name: String,
    position: i64,
    parent_id: Option<Uuid>,
    slot: Slot,
    overwrites: Vec<PermissionOverwrite>,
}

#[derive(Debug, Default)]
struct State {
    roles: Vec<RemoteRole>,
    channels: Vec<MemoryChannel>,
    emojis: Vec<RemoteEmoji>,
    members: HashSet<Uuid>,
    faults: Vec<Fault>,
    mutations: Vec<Mutation>,
}

impl State {
    fn check(&self, op: Operation, name: &str) -> NexusResult<()> {
        let fault = self
            .faults
            .iter()
            .find(|f| f.op == op && f.name.as_deref().is_none_or(|n| n == name));
        match fault.map(|f| f.kind) {
            None => Ok(()),
            Some(FaultKind::Unauthorized) => Err(NexusError::unauthorized(format!("{op:?} {name}"))),
            Some(FaultKind::Invalid) => Err(NexusError::invalid(format!("{op:?} {name}"))),
            Some(FaultKind::Unavailable) => Err(NexusError::Transient {
                message: format!("{op:?} unavailable"),
            }),
        }
    }

    fn top_position(&self) -> i64 {
        self.roles.iter().map(|r| r.position).max().unwrap_or(0)
    }

    fn push_channel(&mut self, name: &str, position: i64, parent_id: Option<Uuid>, slot: Slot) -> Uuid {
        let id = ids::generate_id();
        self.channels.push(MemoryChannel {
            id,
            name: name.to_owned(),
            position,
            parent_id,
            slot,
            overwrites: Vec::new(),
        });
        id
    }
}

pub struct MemoryWorkspace {
    info: WorkspaceInfo,
    state: Mutex<State>,
}

impl MemoryWorkspace {
    /// A server holding only its @everyone role.
    pub fn new(name: &str) -> Self {
        let everyone = RemoteRole {
            id: ids::generate_id(),
            name: "@everyone".into(),
            permissions: Permissions::default_everyone().bits(),
            color: 0,
            hoist: false,
            mentionable: false,
            position: 0,
            is_default: true,
        };
        Self {
            info: WorkspaceInfo {
                id: ids::generate_id(),
                name: name.to_owned(),
            },
            state: Mutex::new(State {
                roles: vec![everyone],
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ── Seeding ─────────────────────────────────────────────────────────────

    /// Add a role at the top of the hierarchy.
    pub fn add_role(&self, name: &str, permissions: u64) -> Uuid {
        let mut state = self.state();
        let position = state.top_position() + 1;
        let id = ids::generate_id();
        state.roles.push(RemoteRole {
            id,
            name: name.to_owned(),
            permissions,
            color: 0,
            hoist: false,
            mentionable: false,
            position,
            is_default: false,
        });
        id
    }

    /// Add a role with an explicit position.
    pub fn add_role_at(&self, name: &str, position: i64) -> Uuid {
        let id = self.add_role(name, 0);
        let mut state = self.state();
        if let Some(role) = state.roles.iter_mut().find(|r| r.id == id) {
            role.position = position;
        }
        id
    }

    pub fn add_category(&self, name: &str, position: i64, overwrites: Vec<PermissionOverwrite>) -> Uuid {
        let id = self.state().push_channel(name, position, None, Slot::Category);
        self.set_channel_overwrites(id, overwrites);
        id
    }

    pub fn add_text_channel(&self, name: &str, position: i64, parent_id: Option<Uuid>) -> Uuid {
        let kind = RemoteChannelKind::Text {
            topic: Some(format!("All about {name}")),
            slow_mode_seconds: 0,
            nsfw: false,
        };
        self.state()
            .push_channel(name, position, parent_id, Slot::Channel(kind))
    }

    pub fn add_voice_channel(&self, name: &str, position: i64, parent_id: Option<Uuid>) -> Uuid {
        let kind = RemoteChannelKind::Voice {
            user_limit: 0,
            bitrate: 64_000,
        };
        self.state()
            .push_channel(name, position, parent_id, Slot::Channel(kind))
    }

    /// Add a channel of a kind the engine does not capture (forum, stage...).
    pub fn add_other_channel(&self, name: &str, kind: &str, parent_id: Option<Uuid>) -> Uuid {
        let kind = RemoteChannelKind::Other(kind.to_owned());
        self.state().push_channel(name, 0, parent_id, Slot::Channel(kind))
    }

    pub fn set_channel_overwrites(&self, channel_id: Uuid, overwrites: Vec<PermissionOverwrite>) {
        if let Some(ch) = self.state().channels.iter_mut().find(|c| c.id == channel_id) {
            ch.overwrites = overwrites;
        }
    }

    pub fn add_emoji(&self, name: &str, url: Option<&str>) -> Uuid {
        let id = ids::generate_id();
        self.state().emojis.push(RemoteEmoji {
            id,
            name: name.to_owned(),
            url: url.map(str::to_owned),
        });
        id
    }

    pub fn add_member(&self, user_id: Uuid) {
        self.state().members.insert(user_id);
    }

    // ── Fault injection ─────────────────────────────────────────────────────

    /// Fail `op` with `Unauthorized` for the object called `name`.
    pub fn deny(&self, op: Operation, name: &str) {
        self.push_fault(op, Some(name), FaultKind::Unauthorized);
    }

    /// Fail `op` with `InvalidRequest` for the object called `name`.
    pub fn reject(&self, op: Operation, name: &str) {
        self.push_fault(op, Some(name), FaultKind::Invalid);
    }

    /// Fail every call of `op` with a transient error.
    pub fn fail_listing(&self, op: Operation) {
        self.push_fault(op, None, FaultKind::Unavailable);
    }

    fn push_fault(&self, op: Operation, name: Option<&str>, kind: FaultKind) {
        self.state().faults.push(Fault {
            op,
            name: name.map(str::to_owned),
            kind,
        });
    }

    // ── Inspection ──────────────────────────────────────────────────────────

    pub fn default_role_id(&self) -> Uuid {
        self.state()
            .roles
            .iter()
            .find(|r| r.is_default)
            .map(|r| r.id)
            .unwrap_or_default()
    }

    /// Roles in listing order: @everyone, then by descending position.
    pub fn roles(&self) -> Vec<RemoteRole> {
        let state = self.state();
        let mut roles = state.roles.clone();
        roles.sort_by_key(|r| (!r.is_default, std::cmp::Reverse(r.position)));
        roles
    }

    pub fn category(&self, name: &str) -> Option<RemoteCategory> {
        self.categories().into_iter().find(|c| c.name == name)
    }

    pub fn channel(&self, name: &str) -> Option<RemoteChannel> {
        self.channels().into_iter().find(|c| c.name == name)
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.state().mutations.clone()
    }

    fn categories(&self) -> Vec<RemoteCategory> {
        self.state()
            .channels
            .iter()
            .filter(|c| matches!(c.slot, Slot::Category))
            .map(|c| RemoteCategory {
                id: c.id,
                name: c.name.clone(),
                position: c.position,
                overwrites: c.overwrites.clone(),
            })
            .collect()
    }

    fn channels(&self) -> Vec<RemoteChannel> {
        self.state()
            .channels
            .iter()
            .filter_map(|c| match &c.slot {
                Slot::Category => None,
                Slot::Channel(kind) => Some(RemoteChannel {
                    id: c.id,
                    name: c.name.clone(),
                    position: c.position,
                    parent_id: c.parent_id,
                    kind: kind.clone(),
                    overwrites: c.overwrites.clone(),
                }),
            })
            .collect()
    }

    fn create_channel(
        &self,
        name: &str,
        position: i64,
        parent_id: Option<Uuid>,
        slot: Slot,
    ) -> NexusResult<Uuid> {
        let mut state = self.state();
        state.mutations.push(Mutation::CreateChannel(name.to_owned()));
        state.check(Operation::CreateChannel, name)?;
        if let Some(parent) = parent_id {
            let parent_is_category = state
                .channels
                .iter()
                .any(|c| c.id == parent && matches!(c.slot, Slot::Category));
            if !parent_is_category {
                return Err(NexusError::invalid(format!("unknown category {parent}")));
            }
        }
        Ok(state.push_channel(name, position, parent_id, slot))
    }
}

#[async_trait]
impl WorkspaceAccessor for MemoryWorkspace {
    fn workspace(&self) -> &WorkspaceInfo {
        &self.info
    }

    async fn list_roles(&self) -> NexusResult<Vec<RemoteRole>> {
        self.state().check(Operation::ListRoles, "")?;
        Ok(self.roles())
    }

    async fn list_categories(&self) -> NexusResult<Vec<RemoteCategory>> {
        self.state().check(Operation::ListCategories, "")?;
        Ok(self.categories())
    }

    async fn list_channels(&self) -> NexusResult<Vec<RemoteChannel>> {
        self.state().check(Operation::ListChannels, "")?;
        Ok(self.channels())
    }

    async fn list_emojis(&self) -> NexusResult<Vec<RemoteEmoji>> {
        let state = self.state();
        state.check(Operation::ListEmojis, "")?;
        Ok(state.emojis.clone())
    }
}

#[async_trait]
impl WorkspaceMutator for MemoryWorkspace {
    async fn delete_role(&self, role_id: Uuid) -> NexusResult<()> {
        let mut state = self.state();
        state.mutations.push(Mutation::DeleteRole(role_id));
        let index = state
            .roles
            .iter()
            .position(|r| r.id == role_id)
            .ok_or_else(|| NexusError::not_found("Role"))?;
        let role = &state.roles[index];
        state.check(Operation::DeleteRole, &role.name)?;
        if role.is_default {
            return Err(NexusError::invalid("cannot delete @everyone"));
        }
        state.roles.remove(index);
        Ok(())
    }

    async fn delete_channel(&self, channel_id: Uuid) -> NexusResult<()> {
        let mut state = self.state();
        state.mutations.push(Mutation::DeleteChannel(channel_id));
        let index = state
            .channels
            .iter()
            .position(|c| c.id == channel_id)
            .ok_or_else(|| NexusError::not_found("Channel"))?;
        state.check(Operation::DeleteChannel, &state.channels[index].name)?;
        let removed = state.channels.remove(index);
        // Children of a deleted category are left without a parent.
        for child in state.channels.iter_mut().filter(|c| c.parent_id == Some(removed.id)) {
            child.parent_id = None;
        }
        Ok(())
    }

    async fn create_role(&self, attrs: &RoleAttrs) -> NexusResult<Uuid> {
        let mut state = self.state();
        state.mutations.push(Mutation::CreateRole(attrs.name.clone()));
        state.check(Operation::CreateRole, &attrs.name)?;
        let id = ids::generate_id();
        let position = state.top_position() + 1;
        state.roles.push(RemoteRole {
            id,
            name: attrs.name.clone(),
            permissions: attrs.permissions,
            color: attrs.color,
            hoist: attrs.hoist,
            mentionable: attrs.mentionable,
            position,
            is_default: false,
        });
        Ok(id)
    }

    async fn create_category(&self, attrs: &CategoryAttrs) -> NexusResult<Uuid> {
        let mut state = self.state();
        state.mutations.push(Mutation::CreateCategory(attrs.name.clone()));
        state.check(Operation::CreateCategory, &attrs.name)?;
        Ok(state.push_channel(&attrs.name, attrs.position, None, Slot::Category))
    }

    async fn create_text_channel(
        &self,
        attrs: &TextChannelAttrs,
        category_id: Option<Uuid>,
    ) -> NexusResult<Uuid> {
        let kind = RemoteChannelKind::Text {
            topic: attrs.topic.clone(),
            slow_mode_seconds: attrs.slow_mode_seconds,
            nsfw: attrs.nsfw,
        };
        self.create_channel(&attrs.name, attrs.position, category_id, Slot::Channel(kind))
    }

    async fn create_voice_channel(
        &self,
        attrs: &VoiceChannelAttrs,
        category_id: Option<Uuid>,
    ) -> NexusResult<Uuid> {
        let kind = RemoteChannelKind::Voice {
            user_limit: attrs.user_limit,
            bitrate: attrs.bitrate,
        };
        self.create_channel(&attrs.name, attrs.position, category_id, Slot::Channel(kind))
    }

    async fn set_overwrites(
        &self,
        channel_id: Uuid,
        overwrites: &[PermissionOverwrite],
    ) -> NexusResult<()> {
        let mut state = self.state();
        state.mutations.push(Mutation::SetOverwrites(channel_id));
        let index = state
            .channels
            .iter()
            .position(|c| c.id == channel_id)
            .ok_or_else(|| NexusError::not_found("Channel"))?;
        state.check(Operation::SetOverwrites, &state.channels[index].name)?;
        state.channels[index].overwrites = overwrites.to_vec();
        Ok(())
    }

    async fn member_exists(&self, user_id: Uuid) -> NexusResult<bool> {
        let state = self.state();
        state.check(Operation::MemberExists, &user_id.to_string())?;
        Ok(state.members.contains(&user_id))
    }
}
