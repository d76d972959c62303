//! Category and channel records.
//!
//! Only text and voice channels are captured. Categories are kept apart from
//! channels because channels refer to them by their source ID, and that ID has
//! to be remapped when the categories are recreated elsewhere.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::PermissionOverwrite;

/// A captured channel category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID on the source server
    pub source_id: Uuid,

    pub name: String,

    pub position: i64,

    /// Overwrites set directly on the category (inherited ones are not flattened in)
    #[serde(default)]
    pub overwrites: Vec<PermissionOverwrite>,
}

impl Category {
    pub fn attrs(&self) -> CategoryAttrs {
        CategoryAttrs {
            name: self.name.clone(),
            position: self.position,
        }
    }
}

/// A captured text or voice channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub source_id: Option<Uuid>,

    pub name: String,

    pub position: i64,

    /// Source ID of the parent category, if any
    pub category_id: Option<Uuid>,

    #[serde(default)]
    pub overwrites: Vec<PermissionOverwrite>,

    #[serde(flatten)]
    pub settings: ChannelSettings,
}

/// Kind-specific channel attributes, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelSettings {
    Text {
        topic: Option<String>,
        /// Slowmode delay in seconds (0 = off)
        slow_mode_seconds: i64,
        nsfw: bool,
    },
    Voice {
        /// 0 = unlimited
        user_limit: i64,
        /// Bits per second
        bitrate: i64,
    },
}

/// Body of a category creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAttrs {
    pub name: String,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChannelAttrs {
    pub name: String,
    pub position: i64,
    pub topic: Option<String>,
    pub slow_mode_seconds: i64,
    pub nsfw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceChannelAttrs {
    pub name: String,
    pub position: i64,
    pub user_limit: i64,
    pub bitrate: i64,
}

/// Creation body for a captured channel, split by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelAttrs {
    Text(TextChannelAttrs),
    Voice(VoiceChannelAttrs),
}

impl Channel {
    pub fn attrs(&self) -> ChannelAttrs {
        match &self.settings {
            ChannelSettings::Text {
                topic,
                slow_mode_seconds,
                nsfw,
            } => ChannelAttrs::Text(TextChannelAttrs {
                name: self.name.clone(),
                position: self.position,
                topic: topic.clone(),
                slow_mode_seconds: *slow_mode_seconds,
                nsfw: *nsfw,
            }),
            ChannelSettings::Voice {
                user_limit,
                bitrate,
            } => ChannelAttrs::Voice(VoiceChannelAttrs {
                name: self.name.clone(),
                position: self.position,
                user_limit: *user_limit,
                bitrate: *bitrate,
            }),
        }
    }
}
