//! Capture engine: reads a live server into a [`Snapshot`].
//!
//! Capture is best effort and strictly read-only. A listing that fails (after
//! retries) leaves its section empty and logs a warning; it never fails the
//! whole capture.

use chrono::Utc;
use nexus_common::{
    error::NexusResult,
    models::{Category, Channel, ChannelSettings, EmojiRef, Role, Snapshot},
    permissions::PermissionOverwrite,
};
use std::future::Future;
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;
use crate::workspace::{RemoteChannelKind, RemoteRole, WorkspaceAccessor};

#[derive(Debug, Clone, Default)]
pub struct CaptureEngine {
    retry: RetryPolicy,
}

impl CaptureEngine {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Capture the structure of the server behind `accessor`.
    pub async fn capture<A>(&self, accessor: &A) -> Snapshot
    where
        A: WorkspaceAccessor + ?Sized,
    {
        let info = accessor.workspace();
        let mut snapshot = Snapshot::new(info.id, info.name.clone(), Utc::now());

        let roles = self.listing("roles", || accessor.list_roles()).await;
        let (default_role_id, roles) = split_default_role(roles);
        snapshot.default_role_id = default_role_id;
        snapshot.roles = roles.into_iter().map(role_record).collect();

        let categories = self
            .listing("categories", || accessor.list_categories())
            .await;
        snapshot.categories = categories
            .into_iter()
            .map(|c| Category {
                source_id: c.id,
                overwrites: explicit_overwrites(&c.name, c.overwrites),
                name: c.name,
                position: c.position,
            })
            .collect();

        let channels = self.listing("channels", || accessor.list_channels()).await;
        for channel in channels {
            let settings = match channel.kind {
                RemoteChannelKind::Text {
                    topic,
                    slow_mode_seconds,
                    nsfw,
                } => ChannelSettings::Text {
                    topic,
                    slow_mode_seconds,
                    nsfw,
                },
                RemoteChannelKind::Voice {
                    user_limit,
                    bitrate,
                } => ChannelSettings::Voice {
                    user_limit,
                    bitrate,
                },
                RemoteChannelKind::Other(kind) => {
                    debug!(channel = %channel.name, %kind, "skipping unsupported channel kind");
                    continue;
                }
            };
            snapshot.channels.push(Channel {
                source_id: Some(channel.id),
                overwrites: explicit_overwrites(&channel.name, channel.overwrites),
                name: channel.name,
                position: channel.position,
                category_id: channel.parent_id,
                settings,
            });
        }

        let emojis = self.listing("emojis", || accessor.list_emojis()).await;
        snapshot.emojis = emojis
            .into_iter()
            .map(|e| {
                let source_url = e.url.filter(|url| !url.is_empty());
                if source_url.is_none() {
                    warn!(emoji = %e.name, "emoji has no source URL");
                }
                EmojiRef {
                    name: e.name,
                    source_url,
                }
            })
            .collect();

        info!(
            workspace = %snapshot.workspace_id,
            roles = snapshot.roles.len(),
            categories = snapshot.categories.len(),
            channels = snapshot.channels.len(),
            emojis = snapshot.emojis.len(),
            "captured server structure"
        );
        snapshot
    }

    async fn listing<T, F, Fut>(&self, what: &str, op: F) -> Vec<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = NexusResult<Vec<T>>>,
    {
        match self.retry.run(what, op).await {
            Ok(items) => items,
            Err(e) => {
                warn!(what, error = %e, "listing failed, section left empty");
                Vec::new()
            }
        }
    }
}

/// Capture with the default retry policy.
pub async fn capture<A>(accessor: &A) -> Snapshot
where
    A: WorkspaceAccessor + ?Sized,
{
    CaptureEngine::default().capture(accessor).await
}

/// Remove @everyone from the hierarchy, returning its ID.
///
/// Accessors flag the default role. If none is flagged, the first entry of the
/// hierarchy is taken to be it.
fn split_default_role(mut roles: Vec<RemoteRole>) -> (Option<uuid::Uuid>, Vec<RemoteRole>) {
    let index = match roles.iter().position(|r| r.is_default) {
        Some(index) => index,
        None if roles.is_empty() => return (None, roles),
        None => {
            warn!("no role flagged as default, treating the first one as @everyone");
            0
        }
    };
    let default_role = roles.remove(index);
    (Some(default_role.id), roles)
}

fn role_record(role: RemoteRole) -> Role {
    Role {
        source_id: Some(role.id),
        name: role.name,
        permissions: role.permissions,
        color: role.color,
        hoist: role.hoist,
        mentionable: role.mentionable,
        position: role.position,
    }
}

fn explicit_overwrites(owner: &str, overwrites: Vec<PermissionOverwrite>) -> Vec<PermissionOverwrite> {
    for ow in &overwrites {
        let overlap = ow.overlap();
        if !overlap.is_empty() {
            debug!(%owner, target = %ow.target_id, ?overlap, "overwrite allows and denies the same bits");
        }
    }
    overwrites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryWorkspace, Operation};
    use nexus_common::permissions::{OverwriteType, Permissions};

    #[tokio::test]
    async fn default_role_is_never_captured() {
        let ws = MemoryWorkspace::new("guild");
        for i in 0..5 {
            ws.add_role(&format!("role-{i}"), Permissions::VIEW_CHANNEL.bits());
        }

        let snapshot = capture(&ws).await;

        assert_eq!(snapshot.roles.len(), 5);
        assert!(snapshot.roles.iter().all(|r| r.name != "@everyone"));
        assert_eq!(snapshot.default_role_id, Some(ws.default_role_id()));
    }

    #[tokio::test]
    async fn hierarchy_order_is_kept_minus_default() {
        // Enumerated as [everyone, Mod, VIP] with positions 0, 2, 1.
        let ws = MemoryWorkspace::new("guild");
        ws.add_role_at("Mod", 2);
        ws.add_role_at("VIP", 1);

        let snapshot = capture(&ws).await;

        let names: Vec<_> = snapshot.roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Mod", "VIP"]);
        assert_eq!(snapshot.roles[0].position, 2);
        assert_eq!(snapshot.roles[1].position, 1);
    }

    #[tokio::test]
    async fn unsupported_channel_kinds_are_skipped() {
        let ws = MemoryWorkspace::new("guild");
        let cat = ws.add_category("Info", 0, vec![]);
        ws.add_text_channel("rules", 0, Some(cat));
        ws.add_other_channel("announcements", "announcement", Some(cat));
        ws.add_other_channel("help-forum", "forum", None);
        ws.add_voice_channel("lounge", 1, None);

        let snapshot = capture(&ws).await;

        let names: Vec<_> = snapshot.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["rules", "lounge"]);
        assert_eq!(snapshot.channels[0].category_id, Some(cat));
        assert_eq!(snapshot.channels[1].category_id, None);
        assert_eq!(snapshot.categories[0].source_id, cat);
    }

    #[tokio::test]
    async fn overwrites_are_copied_verbatim() {
        let ws = MemoryWorkspace::new("guild");
        let mods = ws.add_role("Mod", 0);
        let conflicting = PermissionOverwrite {
            target_id: mods,
            target_type: OverwriteType::Role,
            allow: Permissions::SEND_MESSAGES.bits() | (1 << 45),
            deny: Permissions::SEND_MESSAGES.bits(),
        };
        let cat = ws.add_category("Staff", 0, vec![conflicting.clone()]);
        let chan = ws.add_text_channel("mod-chat", 0, Some(cat));
        ws.set_channel_overwrites(chan, vec![conflicting.clone()]);

        let snapshot = capture(&ws).await;

        assert_eq!(snapshot.categories[0].overwrites, vec![conflicting.clone()]);
        assert_eq!(snapshot.channels[0].overwrites, vec![conflicting]);
    }

    #[tokio::test]
    async fn emojis_keep_only_name_and_url() {
        let ws = MemoryWorkspace::new("guild");
        ws.add_emoji("party", Some("https://cdn.nexus.example/emoji/party.png"));
        ws.add_emoji("blank", Some(""));
        ws.add_emoji("ghost", None);

        let snapshot = capture(&ws).await;

        assert_eq!(
            snapshot.emojis,
            vec![
                EmojiRef {
                    name: "party".into(),
                    source_url: Some("https://cdn.nexus.example/emoji/party.png".into()),
                },
                EmojiRef {
                    name: "blank".into(),
                    source_url: None,
                },
                EmojiRef {
                    name: "ghost".into(),
                    source_url: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn failed_listing_leaves_section_empty() {
        let ws = MemoryWorkspace::new("guild");
        ws.add_role("Mod", 0);
        ws.add_text_channel("general", 0, None);
        ws.fail_listing(Operation::ListChannels);

        let snapshot = CaptureEngine::new(RetryPolicy::none()).capture(&ws).await;

        assert_eq!(snapshot.roles.len(), 1);
        assert!(snapshot.channels.is_empty());
        assert!(ws.mutations().is_empty());
    }
}
