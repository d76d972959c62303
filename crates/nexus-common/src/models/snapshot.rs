//! Snapshot model: the captured structure of one server at one point in time.
//!
//! Every field is always written: empty sequences and `null`s are explicit so
//! a document can be read back without guessing at defaults.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::channel::{Category, Channel};
use super::role::Role;

/// Root record of a backup.
///
/// Individual records carry whatever the server reported. Only the source IDs
/// are checked on read: restore keys its ID maps on them, so two records
/// sharing one would send overwrites and children to the wrong object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_source_ids"))]
pub struct Snapshot {
    pub workspace_name: String,

    /// Engine-local capture time
    pub captured_at: DateTime<Utc>,

    pub workspace_id: Uuid,

    /// The source server's @everyone role, so overwrites aimed at it can be re-targeted
    pub default_role_id: Option<Uuid>,

    /// Hierarchy order as enumerated, @everyone excluded
    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub channels: Vec<Channel>,

    #[serde(default)]
    pub emojis: Vec<EmojiRef>,
}

impl Snapshot {
    /// An empty snapshot for the given server.
    pub fn new(workspace_id: Uuid, workspace_name: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            workspace_name: workspace_name.into(),
            captured_at,
            workspace_id,
            default_role_id: None,
            roles: Vec::new(),
            categories: Vec::new(),
            channels: Vec::new(),
            emojis: Vec::new(),
        }
    }

    /// Total number of overwrites across categories and channels.
    pub fn overwrite_count(&self) -> usize {
        self.categories.iter().map(|c| c.overwrites.len()).sum::<usize>()
            + self.channels.iter().map(|c| c.overwrites.len()).sum::<usize>()
    }
}

/// A custom emoji, stored by reference only.
///
/// The image bytes live behind `source_url`; recreating the emoji would require
/// fetching them again. `source_url` is `None` when the server had no URL for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiRef {
    pub name: String,
    pub source_url: Option<String>,
}

fn validate_source_ids(snapshot: &Snapshot) -> Result<(), ValidationError> {
    let roles = snapshot.roles.iter().map(|r| r.source_id);
    let categories = snapshot.categories.iter().map(|c| Some(c.source_id));
    let channels = snapshot.channels.iter().map(|c| c.source_id);

    for (section, ids) in [
        ("roles", roles.collect::<Vec<_>>()),
        ("categories", categories.collect()),
        ("channels", channels.collect()),
    ] {
        let mut seen = HashMap::new();
        for (index, id) in ids.into_iter().enumerate() {
            let Some(id) = id else { continue };
            if let Some(first) = seen.insert(id, index) {
                return Err(ValidationError::new("duplicate_source_id").with_message(
                    format!("{section}[{index}].source_id repeats {section}[{first}] ({id})").into(),
                ));
            }
        }
    }
    Ok(())
}
