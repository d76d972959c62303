//! Backup document encoding.
//!
//! A document is the snapshot's JSON object with a `schema_version` field
//! alongside the snapshot fields:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "workspace_name": "My Server",
//!   "captured_at": "2026-03-01T12:00:00Z",
//!   "workspace_id": "0192...",
//!   "default_role_id": "0192...",
//!   "roles": [],
//!   "categories": [],
//!   "channels": [],
//!   "emojis": []
//! }
//! ```
//!
//! Unknown fields are ignored so older builds can read newer documents.

use anyhow::Context;
use nexus_common::{
    error::{NexusError, NexusResult},
    models::Snapshot,
    validation::validate_document,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentRef<'a> {
    schema_version: u32,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

#[derive(Deserialize)]
struct Document {
    /// Documents written before versioning are version 1.
    #[serde(default = "first_version")]
    schema_version: u32,
    #[serde(flatten)]
    snapshot: Snapshot,
}

fn first_version() -> u32 {
    1
}

/// Encode a snapshot as a pretty-printed JSON document.
pub fn serialize(snapshot: &Snapshot) -> NexusResult<Vec<u8>> {
    let doc = DocumentRef {
        schema_version: SCHEMA_VERSION,
        snapshot,
    };
    let bytes = serde_json::to_vec_pretty(&doc).context("failed to encode snapshot")?;
    Ok(bytes)
}

/// Decode and validate a backup document.
pub fn deserialize(bytes: &[u8]) -> NexusResult<Snapshot> {
    let doc: Document = serde_json::from_slice(bytes).map_err(|e| NexusError::MalformedSnapshot {
        message: e.to_string(),
    })?;

    match doc.schema_version {
        0 => return Err(NexusError::malformed("schema_version 0 is not a valid version")),
        v if v > SCHEMA_VERSION => {
            warn!(version = v, supported = SCHEMA_VERSION, "reading a newer backup document");
        }
        _ => {}
    }

    validate_document(&doc.snapshot)?;
    Ok(doc.snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nexus_common::models::{Category, Channel, ChannelSettings, EmojiRef, Role};
    use nexus_common::permissions::{OverwriteType, PermissionOverwrite};
    use serde_json::json;
    use uuid::Uuid;

    fn sample() -> Snapshot {
        let category_id = Uuid::new_v4();
        let overwrite = PermissionOverwrite {
            target_id: Uuid::new_v4(),
            target_type: OverwriteType::Member,
            allow: u64::MAX,
            deny: 1 << 52 | 1 << 40,
        };
        Snapshot {
            workspace_name: "Nexus HQ".into(),
            captured_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
                + chrono::Duration::nanoseconds(123_456_789),
            workspace_id: Uuid::new_v4(),
            default_role_id: None,
            roles: vec![Role {
                source_id: Some(Uuid::new_v4()),
                name: "Admin".into(),
                permissions: 1 << 40 | 1 << 33,
                color: 0x1_0000_0000,
                hoist: true,
                mentionable: true,
                position: 7,
            }],
            categories: vec![Category {
                source_id: category_id,
                name: "General".into(),
                position: 0,
                overwrites: vec![overwrite.clone()],
            }],
            channels: vec![
                Channel {
                    source_id: None,
                    name: "welcome".into(),
                    position: 0,
                    category_id: Some(category_id),
                    overwrites: vec![overwrite],
                    settings: ChannelSettings::Text {
                        topic: None,
                        slow_mode_seconds: 0,
                        nsfw: true,
                    },
                },
                Channel {
                    source_id: Some(Uuid::new_v4()),
                    name: "voice".into(),
                    position: 1,
                    category_id: None,
                    overwrites: vec![],
                    settings: ChannelSettings::Voice {
                        user_limit: 99,
                        bitrate: 384_000,
                    },
                },
            ],
            emojis: vec![
                EmojiRef {
                    name: "nexus".into(),
                    source_url: Some("https://cdn.nexus.example/e/nexus.png".into()),
                },
                EmojiRef {
                    name: String::new(),
                    source_url: None,
                },
            ],
        }
    }

    #[test]
    fn round_trip_is_lossless() {
        let snapshot = sample();
        let bytes = serialize(&snapshot).unwrap();
        assert_eq!(deserialize(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn empty_sections_and_nulls_are_written() {
        let snapshot = Snapshot::new(Uuid::new_v4(), "empty", Utc::now());
        let bytes = serialize(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["default_role_id"], serde_json::Value::Null);
        for section in ["roles", "categories", "channels", "emojis"] {
            assert_eq!(value[section], json!([]), "{section}");
        }
        assert_eq!(deserialize(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn wide_bitmasks_are_not_truncated() {
        let snapshot = sample();
        let bytes = serialize(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["categories"][0]["overwrites"][0]["allow"].as_u64(), Some(u64::MAX));
        assert_eq!(value["roles"][0]["color"].as_i64(), Some(0x1_0000_0000));
    }

    #[test]
    fn unknown_fields_and_missing_version_are_tolerated() {
        let doc = json!({
            "workspace_name": "legacy",
            "captured_at": "2025-01-01T00:00:00Z",
            "workspace_id": Uuid::nil(),
            "default_role_id": null,
            "roles": [{
                "source_id": null,
                "name": "Helper",
                "permissions": 8,
                "color": 0,
                "hoist": false,
                "mentionable": true,
                "position": 1,
                "icon": "ignored"
            }],
            "stickers": ["ignored"]
        });
        let snapshot = deserialize(&serde_json::to_vec(&doc).unwrap()).unwrap();
        assert_eq!(snapshot.roles[0].name, "Helper");
        assert!(snapshot.channels.is_empty());
        assert!(snapshot.emojis.is_empty());
    }

    #[test]
    fn garbage_is_malformed() {
        let err = deserialize(b"{ not json").unwrap_err();
        assert!(matches!(err, NexusError::MalformedSnapshot { .. }));

        let err = deserialize(br#"{"workspace_name": "x"}"#).unwrap_err();
        assert!(matches!(err, NexusError::MalformedSnapshot { .. }));
    }

    #[test]
    fn odd_server_values_survive_a_round_trip() {
        let mut snapshot = sample();
        snapshot.roles[0].name = "r".repeat(101);
        snapshot.channels[0].name = String::new();
        snapshot.channels[0].settings = ChannelSettings::Text {
            topic: Some("t".repeat(5000)),
            slow_mode_seconds: -1,
            nsfw: false,
        };
        let bytes = serialize(&snapshot).unwrap();
        assert_eq!(deserialize(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn repeated_source_ids_are_malformed() {
        let mut snapshot = sample();
        let duplicate = snapshot.categories[0].clone();
        snapshot.categories.push(duplicate);
        let bytes = serialize(&snapshot).unwrap();
        let err = deserialize(&bytes).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_SNAPSHOT");
        assert!(err.to_string().contains("categories[1].source_id"), "{err}");
    }
}
