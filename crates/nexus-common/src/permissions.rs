//! Permission bitfields and channel-level overwrites.
//!
//! Permissions in Nexus use a bitfield system (like Discord). Bits above 31 are
//! in use, so every mask is carried as a full `u64` and never narrowed.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

bitflags! {
    /// Server-level and channel-level permissions.
    ///
    /// Each permission is a single bit. Roles combine permissions via OR.
    /// Channel overwrites can explicitly ALLOW or DENY specific permissions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Permissions: u64 {
        // === General ===
        const VIEW_CHANNEL          = 1 << 0;
        const MANAGE_SERVER         = 1 << 1;
        const MANAGE_CHANNELS       = 1 << 2;
        const MANAGE_ROLES          = 1 << 3;
        const CREATE_INVITES        = 1 << 4;
        const KICK_MEMBERS          = 1 << 5;
        const BAN_MEMBERS           = 1 << 6;
        const VIEW_AUDIT_LOG        = 1 << 7;
        const CHANGE_NICKNAME       = 1 << 8;
        const MANAGE_NICKNAMES      = 1 << 9;
        const MANAGE_EMOJIS         = 1 << 10;
        const MANAGE_WEBHOOKS       = 1 << 11;

        // === Text ===
        const SEND_MESSAGES         = 1 << 12;
        const SEND_MESSAGES_IN_THREADS = 1 << 13;
        const CREATE_PUBLIC_THREADS = 1 << 14;
        const CREATE_PRIVATE_THREADS = 1 << 15;
        const MANAGE_THREADS        = 1 << 16;
        const EMBED_LINKS           = 1 << 17;
        const ATTACH_FILES          = 1 << 18;
        const ADD_REACTIONS         = 1 << 19;
        const USE_EXTERNAL_EMOJIS   = 1 << 20;
        const MENTION_EVERYONE      = 1 << 21;
        const MANAGE_MESSAGES       = 1 << 22;
        const READ_MESSAGE_HISTORY  = 1 << 23;
        const USE_COMMANDS          = 1 << 24;

        // === Voice ===
        const CONNECT               = 1 << 25;
        const SPEAK                 = 1 << 26;
        const VIDEO                 = 1 << 27;
        const MUTE_MEMBERS          = 1 << 28;
        const DEAFEN_MEMBERS        = 1 << 29;
        const MOVE_MEMBERS          = 1 << 30;
        const USE_VAD               = 1 << 31;
        const SCREEN_SHARE          = 1 << 32;
        const STAGE_SPEAKER         = 1 << 33;

        // === Nexus-specific ===
        const RECORD_VOICE          = 1 << 34;
        const MANAGE_POLLS          = 1 << 35;
        const MANAGE_EVENTS         = 1 << 36;
        const PIN_MESSAGES          = 1 << 37;
        const MANAGE_PLUGINS        = 1 << 38;
        const VIEW_ANALYTICS        = 1 << 39;

        // === Meta ===
        const ADMINISTRATOR         = 1 << 40;
    }
}

impl Permissions {
    /// Default permissions for the @everyone role in a new server.
    pub fn default_everyone() -> Self {
        Self::VIEW_CHANNEL
            | Self::SEND_MESSAGES
            | Self::SEND_MESSAGES_IN_THREADS
            | Self::CREATE_PUBLIC_THREADS
            | Self::EMBED_LINKS
            | Self::ATTACH_FILES
            | Self::ADD_REACTIONS
            | Self::USE_EXTERNAL_EMOJIS
            | Self::READ_MESSAGE_HISTORY
            | Self::USE_COMMANDS
            | Self::CONNECT
            | Self::SPEAK
            | Self::VIDEO
            | Self::USE_VAD
            | Self::SCREEN_SHARE
            | Self::CHANGE_NICKNAME
            | Self::CREATE_INVITES
    }
}

/// Channel- or category-level permission overwrite.
///
/// `allow` and `deny` are independent planes. They may share bits; the platform
/// decides precedence, so no normalization happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    /// The role or member ID this overwrite applies to
    pub target_id: Uuid,
    /// Whether this targets a role or a member
    pub target_type: OverwriteType,
    /// Permissions explicitly allowed
    pub allow: u64,
    /// Permissions explicitly denied
    pub deny: u64,
}

impl PermissionOverwrite {
    /// Bits present in both planes.
    pub fn overlap(&self) -> Permissions {
        Permissions::from_bits_retain(self.allow & self.deny)
    }

    /// Same allow/deny pair pointed at another target.
    pub fn retarget(&self, target_id: Uuid) -> Self {
        Self {
            target_id,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteType {
    Role,
    #[serde(alias = "user")]
    Member,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_bits_survive() {
        let ow = PermissionOverwrite {
            target_id: Uuid::nil(),
            target_type: OverwriteType::Role,
            allow: Permissions::ADMINISTRATOR.bits() | (1 << 63),
            deny: 0,
        };
        assert_eq!(ow.allow >> 63, 1);
        assert!(ow.overlap().is_empty());
    }

    #[test]
    fn overlapping_planes_are_reported_not_fixed() {
        let ow = PermissionOverwrite {
            target_id: Uuid::nil(),
            target_type: OverwriteType::Member,
            allow: (Permissions::SPEAK | Permissions::CONNECT).bits(),
            deny: Permissions::SPEAK.bits(),
        };
        assert_eq!(ow.overlap(), Permissions::SPEAK);
        assert_eq!(ow.allow & ow.deny, Permissions::SPEAK.bits());
    }

    #[test]
    fn legacy_user_spelling_is_accepted() {
        let t: OverwriteType = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(t, OverwriteType::Member);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"member\"");
    }
}
