//! Role records, one entry per rank of a server's role hierarchy.
//!
//! The @everyone role is never part of a snapshot: it exists on every server,
//! so it is neither captured nor recreated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A captured role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role ID on the source server, used to re-target permission overwrites
    pub source_id: Option<Uuid>,

    /// As reported by the server; never trimmed or length-checked
    pub name: String,

    /// Permission bitfield
    pub permissions: u64,

    /// Role color (hex as integer, e.g., 0xFF5733)
    pub color: i64,

    /// Whether this role is displayed separately in the member list
    pub hoist: bool,

    /// Whether this role can be @mentioned
    pub mentionable: bool,

    /// Position in the role hierarchy (higher = more power)
    pub position: i64,
}

impl Role {
    /// Attributes used to recreate this role on a target server.
    pub fn attrs(&self) -> RoleAttrs {
        RoleAttrs {
            name: self.name.clone(),
            permissions: self.permissions,
            color: self.color,
            hoist: self.hoist,
            mentionable: self.mentionable,
        }
    }
}

/// Body of a role creation call. New roles land at the top of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAttrs {
    pub name: String,
    pub permissions: u64,
    pub color: i64,
    pub hoist: bool,
    pub mentionable: bool,
}
