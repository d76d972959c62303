//! Wire types for the Nexus REST API.
//!
//! Only the fields the backup engine reads are declared; everything else in a
//! response is ignored. Missing fields fall back to their defaults so that a
//! partial object never fails a whole listing.

use nexus_backup::{
    RemoteCategory, RemoteChannel, RemoteChannelKind, RemoteEmoji, RemoteRole, WorkspaceInfo,
};
use nexus_common::models::{CategoryAttrs, RoleAttrs, TextChannelAttrs, VoiceChannelAttrs};
use nexus_common::permissions::PermissionOverwrite;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Created objects come back whole; only the ID matters here.
#[derive(Debug, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ServerWire {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
}

impl From<ServerWire> for WorkspaceInfo {
    fn from(s: ServerWire) -> Self {
        Self { id: s.id, name: s.name }
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleWire {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Stored as a signed 64-bit column server-side.
    #[serde(default)]
    pub permissions: i64,
    #[serde(default)]
    pub color: Option<i64>,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub mentionable: bool,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub is_default: bool,
}

impl From<RoleWire> for RemoteRole {
    fn from(r: RoleWire) -> Self {
        Self {
            id: r.id,
            name: r.name,
            permissions: r.permissions as u64,
            color: r.color.unwrap_or(0),
            hoist: r.hoist,
            mentionable: r.mentionable,
            position: r.position,
            is_default: r.is_default,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateRoleBody<'a> {
    pub name: &'a str,
    pub permissions: i64,
    pub color: i64,
    pub hoist: bool,
    pub mentionable: bool,
}

impl<'a> From<&'a RoleAttrs> for CreateRoleBody<'a> {
    fn from(a: &'a RoleAttrs) -> Self {
        Self {
            name: &a.name,
            permissions: a.permissions as i64,
            color: a.color,
            hoist: a.hoist,
            mentionable: a.mentionable,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelWire {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub channel_type: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub rate_limit_per_user: i64,
    #[serde(default)]
    pub bitrate: Option<i64>,
    #[serde(default)]
    pub user_limit: Option<i64>,
    #[serde(default)]
    pub permission_overwrites: Option<Vec<PermissionOverwrite>>,
}

/// A channel listing entry, split into the two shapes the engine sees.
pub enum Listed {
    Category(RemoteCategory),
    Channel(RemoteChannel),
}

impl From<ChannelWire> for Listed {
    fn from(c: ChannelWire) -> Self {
        let name = c.name.unwrap_or_default();
        let overwrites = c.permission_overwrites.unwrap_or_default();
        let kind = match c.channel_type.as_str() {
            "category" => {
                return Self::Category(RemoteCategory {
                    id: c.id,
                    name,
                    position: c.position,
                    overwrites,
                });
            }
            "text" => RemoteChannelKind::Text {
                topic: c.topic,
                slow_mode_seconds: c.rate_limit_per_user,
                nsfw: c.nsfw,
            },
            "voice" => RemoteChannelKind::Voice {
                user_limit: c.user_limit.unwrap_or(0),
                bitrate: c.bitrate.unwrap_or(0),
            },
            other => RemoteChannelKind::Other(other.to_owned()),
        };
        Self::Channel(RemoteChannel {
            id: c.id,
            name,
            position: c.position,
            parent_id: c.parent_id,
            kind,
            overwrites,
        })
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CreateChannelBody<'a> {
    pub name: &'a str,
    pub channel_type: &'static str,
    pub position: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_user: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<i64>,
}

impl<'a> CreateChannelBody<'a> {
    pub fn category(a: &'a CategoryAttrs) -> Self {
        Self {
            name: &a.name,
            channel_type: "category",
            position: a.position,
            ..Default::default()
        }
    }

    pub fn text(a: &'a TextChannelAttrs, parent_id: Option<Uuid>) -> Self {
        Self {
            name: &a.name,
            channel_type: "text",
            position: a.position,
            parent_id,
            topic: a.topic.as_deref(),
            nsfw: Some(a.nsfw),
            rate_limit_per_user: Some(a.slow_mode_seconds),
            ..Default::default()
        }
    }

    pub fn voice(a: &'a VoiceChannelAttrs, parent_id: Option<Uuid>) -> Self {
        Self {
            name: &a.name,
            channel_type: "voice",
            position: a.position,
            parent_id,
            bitrate: Some(a.bitrate),
            user_limit: Some(a.user_limit),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OverwritesBody<'a> {
    pub permission_overwrites: &'a [PermissionOverwrite],
}

#[derive(Debug, Deserialize)]
pub struct EmojiWire {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl From<EmojiWire> for RemoteEmoji {
    fn from(e: EmojiWire) -> Self {
        Self {
            id: e.id,
            name: e.name,
            url: e.url,
        }
    }
}
