//! Restore engine: replays a [`Snapshot`] onto a live server.
//!
//! Phases run strictly in order, each one finishing before the next starts,
//! because later phases refer to objects created by earlier ones:
//!
//! 1. clear: delete every role except @everyone, then every channel and category
//! 2. roles: recreate roles in reverse snapshot order (lowest authority first)
//! 3. categories: recreate categories, mapping source IDs to new IDs
//! 4. channels: recreate channels under their remapped category
//! 5. overwrites: re-target and apply category/channel overwrites
//!
//! Every remote call has its own outcome. A failed call is recorded in the
//! [`RestoreReport`] and the loop moves on.

use std::collections::HashMap;

use nexus_common::{
    config::RestoreConfig,
    models::{ChannelAttrs, Snapshot},
    permissions::{OverwriteType, PermissionOverwrite},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::report::{ObjectKind, Phase, RestoreReport};
use crate::retry::RetryPolicy;
use crate::workspace::WorkspaceMutator;

/// Source ID → target ID, filled as objects are recreated.
type IdMap = HashMap<Uuid, Uuid>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Run phase 5. When off, overwrites stay in the snapshot but are not applied.
    pub apply_overwrites: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            apply_overwrites: true,
        }
    }
}

impl From<&RestoreConfig> for RestoreOptions {
    fn from(cfg: &RestoreConfig) -> Self {
        Self {
            apply_overwrites: cfg.apply_overwrites,
        }
    }
}

/// An object recreated in phase 3 or 4, kept for the overwrite phase.
struct Recreated<'a> {
    target_id: Uuid,
    name: &'a str,
    overwrites: &'a [PermissionOverwrite],
}

#[derive(Debug, Clone, Default)]
pub struct RestoreEngine {
    options: RestoreOptions,
    retry: RetryPolicy,
}

impl RestoreEngine {
    pub fn new(options: RestoreOptions, retry: RetryPolicy) -> Self {
        Self { options, retry }
    }

    /// Replay `snapshot` onto `target`. Never fails as a whole.
    pub async fn restore<M>(&self, snapshot: &Snapshot, target: &M) -> RestoreReport
    where
        M: WorkspaceMutator + ?Sized,
    {
        let workspace = target.workspace();
        info!(
            source = %snapshot.workspace_id,
            target = %workspace.id,
            captured_at = %snapshot.captured_at,
            "restoring snapshot"
        );

        let mut report = RestoreReport {
            emojis_not_restored: snapshot.emojis.len(),
            ..RestoreReport::default()
        };

        self.clear(target, &mut report).await;
        let roles = self.recreate_roles(snapshot, target, &mut report).await;
        let (categories, mut recreated) = self.recreate_categories(snapshot, target, &mut report).await;
        recreated.extend(
            self.recreate_channels(snapshot, target, &categories, &mut report)
                .await,
        );

        if self.options.apply_overwrites {
            self.replay_overwrites(snapshot, target, &roles, &recreated, &mut report)
                .await;
        } else {
            // Replaces the orphan counts from phases 3 and 4: every overwrite is skipped.
            report.overwrites.skipped = snapshot.overwrite_count();
        }

        info!(
            roles = %report.roles,
            categories = %report.categories,
            channels = %report.channels,
            overwrites = %report.overwrites,
            failures = report.failures.len(),
            "restore finished"
        );
        report
    }

    // ── Phase 1 ─────────────────────────────────────────────────────────────

    async fn clear<M>(&self, target: &M, report: &mut RestoreReport)
    where
        M: WorkspaceMutator + ?Sized,
    {
        match self.retry.run("list roles", || target.list_roles()).await {
            Ok(roles) => {
                for role in roles.iter().filter(|r| !r.is_default) {
                    match self.retry.run("delete role", || target.delete_role(role.id)).await {
                        Ok(()) => report.deleted_roles.succeeded += 1,
                        Err(e) => {
                            report.deleted_roles.failed += 1;
                            report.fail(Phase::Clear, ObjectKind::Role, &role.name, &e);
                        }
                    }
                }
            }
            Err(e) => report.fail(Phase::Clear, ObjectKind::Role, "<role listing>", &e),
        }

        // Channels first, then the categories that held them.
        match self.retry.run("list channels", || target.list_channels()).await {
            Ok(channels) => {
                for channel in &channels {
                    self.delete_channel(target, channel.id, &channel.name, ObjectKind::Channel, report)
                        .await;
                }
            }
            Err(e) => report.fail(Phase::Clear, ObjectKind::Channel, "<channel listing>", &e),
        }
        match self.retry.run("list categories", || target.list_categories()).await {
            Ok(categories) => {
                for category in &categories {
                    self.delete_channel(target, category.id, &category.name, ObjectKind::Category, report)
                        .await;
                }
            }
            Err(e) => report.fail(Phase::Clear, ObjectKind::Category, "<category listing>", &e),
        }

        debug!(roles = %report.deleted_roles, channels = %report.deleted_channels, "cleared target");
    }

    async fn delete_channel<M>(
        &self,
        target: &M,
        id: Uuid,
        name: &str,
        kind: ObjectKind,
        report: &mut RestoreReport,
    ) where
        M: WorkspaceMutator + ?Sized,
    {
        match self.retry.run("delete channel", || target.delete_channel(id)).await {
            Ok(()) => report.deleted_channels.succeeded += 1,
            Err(e) => {
                report.deleted_channels.failed += 1;
                report.fail(Phase::Clear, kind, name, &e);
            }
        }
    }

    // ── Phase 2 ─────────────────────────────────────────────────────────────

    /// Roles are created lowest authority first. Each creation lands on top of
    /// the hierarchy, so walking the (highest-first) snapshot order backwards
    /// rebuilds the source ranking.
    async fn recreate_roles<M>(&self, snapshot: &Snapshot, target: &M, report: &mut RestoreReport) -> IdMap
    where
        M: WorkspaceMutator + ?Sized,
    {
        let mut roles = IdMap::new();
        for role in snapshot.roles.iter().rev() {
            let attrs = role.attrs();
            match self.retry.run("create role", || target.create_role(&attrs)).await {
                Ok(id) => {
                    report.roles.succeeded += 1;
                    if let Some(source_id) = role.source_id {
                        roles.insert(source_id, id);
                    }
                }
                Err(e) => {
                    report.roles.failed += 1;
                    report.fail(Phase::Roles, ObjectKind::Role, &role.name, &e);
                }
            }
        }
        roles
    }

    // ── Phase 3 ─────────────────────────────────────────────────────────────

    async fn recreate_categories<'a, M>(
        &self,
        snapshot: &'a Snapshot,
        target: &M,
        report: &mut RestoreReport,
    ) -> (IdMap, Vec<Recreated<'a>>)
    where
        M: WorkspaceMutator + ?Sized,
    {
        let mut categories = IdMap::new();
        let mut recreated = Vec::new();
        for category in &snapshot.categories {
            let attrs = category.attrs();
            match self.retry.run("create category", || target.create_category(&attrs)).await {
                Ok(id) => {
                    report.categories.succeeded += 1;
                    categories.insert(category.source_id, id);
                    recreated.push(Recreated {
                        target_id: id,
                        name: &category.name,
                        overwrites: &category.overwrites,
                    });
                }
                Err(e) => {
                    report.categories.failed += 1;
                    report.overwrites.skipped += category.overwrites.len();
                    report.fail(Phase::Categories, ObjectKind::Category, &category.name, &e);
                }
            }
        }
        (categories, recreated)
    }

    // ── Phase 4 ─────────────────────────────────────────────────────────────

    async fn recreate_channels<'a, M>(
        &self,
        snapshot: &'a Snapshot,
        target: &M,
        categories: &IdMap,
        report: &mut RestoreReport,
    ) -> Vec<Recreated<'a>>
    where
        M: WorkspaceMutator + ?Sized,
    {
        let mut recreated = Vec::new();
        for channel in &snapshot.channels {
            // An unresolved category never blocks the channel itself.
            let (parent, unlinked) = match channel.category_id {
                None => (None, false),
                Some(source) => match categories.get(&source) {
                    Some(id) => (Some(*id), false),
                    None => (None, true),
                },
            };

            let result = match channel.attrs() {
                ChannelAttrs::Text(attrs) => {
                    self.retry
                        .run("create text channel", || target.create_text_channel(&attrs, parent))
                        .await
                }
                ChannelAttrs::Voice(attrs) => {
                    self.retry
                        .run("create voice channel", || target.create_voice_channel(&attrs, parent))
                        .await
                }
            };

            match result {
                Ok(id) => {
                    report.channels.succeeded += 1;
                    if unlinked {
                        report.unlinked_channels.push(channel.name.clone());
                        report.warn(format!(
                            "channel '{}' created without its category (not recreated)",
                            channel.name
                        ));
                    }
                    recreated.push(Recreated {
                        target_id: id,
                        name: &channel.name,
                        overwrites: &channel.overwrites,
                    });
                }
                Err(e) => {
                    report.channels.failed += 1;
                    report.overwrites.skipped += channel.overwrites.len();
                    report.fail(Phase::Channels, ObjectKind::Channel, &channel.name, &e);
                }
            }
        }
        recreated
    }

    // ── Phase 5 ─────────────────────────────────────────────────────────────

    async fn replay_overwrites<M>(
        &self,
        snapshot: &Snapshot,
        target: &M,
        roles: &IdMap,
        recreated: &[Recreated<'_>],
        report: &mut RestoreReport,
    ) where
        M: WorkspaceMutator + ?Sized,
    {
        if recreated.iter().all(|r| r.overwrites.is_empty()) {
            return;
        }

        // @everyone on the target, for overwrites aimed at the source's @everyone.
        let target_default = match self.retry.run("list roles", || target.list_roles()).await {
            Ok(listing) => listing.iter().find(|r| r.is_default).map(|r| r.id),
            Err(e) => {
                report.warn(format!("could not look up the target @everyone role: {e}"));
                None
            }
        };
        let mut members: HashMap<Uuid, bool> = HashMap::new();

        for object in recreated {
            if object.overwrites.is_empty() {
                continue;
            }

            let mut resolved = Vec::with_capacity(object.overwrites.len());
            for ow in object.overwrites {
                let target_id = match ow.target_type {
                    OverwriteType::Role if Some(ow.target_id) == snapshot.default_role_id => target_default,
                    OverwriteType::Role => roles.get(&ow.target_id).copied(),
                    OverwriteType::Member => {
                        let exists = match members.get(&ow.target_id) {
                            Some(known) => *known,
                            None => {
                                let known = match self
                                    .retry
                                    .run("member lookup", || target.member_exists(ow.target_id))
                                    .await
                                {
                                    Ok(exists) => exists,
                                    Err(e) => {
                                        debug!(member = %ow.target_id, error = %e, "member lookup failed");
                                        report.warn(format!("member lookup for {} failed: {e}", ow.target_id));
                                        false
                                    }
                                };
                                members.insert(ow.target_id, known);
                                known
                            }
                        };
                        exists.then_some(ow.target_id)
                    }
                };

                match target_id {
                    Some(id) => resolved.push(ow.retarget(id)),
                    None => {
                        report.overwrites.skipped += 1;
                        report.warn(format!(
                            "overwrite on '{}' for {:?} {} skipped: target not present",
                            object.name, ow.target_type, ow.target_id
                        ));
                    }
                }
            }

            if resolved.is_empty() {
                continue;
            }
            match self
                .retry
                .run("set overwrites", || target.set_overwrites(object.target_id, &resolved))
                .await
            {
                Ok(()) => report.overwrites.succeeded += resolved.len(),
                Err(e) => {
                    report.overwrites.failed += resolved.len();
                    report.fail(Phase::Overwrites, ObjectKind::Overwrite, object.name, &e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::capture;
    use crate::memory::{MemoryWorkspace, Mutation, Operation};
    use chrono::Utc;
    use nexus_common::models::{Category, Channel, ChannelSettings, Role};
    use nexus_common::permissions::Permissions;

    fn role(name: &str, position: i64) -> Role {
        Role {
            source_id: Some(Uuid::new_v4()),
            name: name.into(),
            permissions: Permissions::VIEW_CHANNEL.bits(),
            color: 0x00FF_5733,
            hoist: true,
            mentionable: false,
            position,
        }
    }

    fn text(name: &str, category_id: Option<Uuid>) -> Channel {
        Channel {
            source_id: Some(Uuid::new_v4()),
            name: name.into(),
            position: 0,
            category_id,
            overwrites: vec![],
            settings: ChannelSettings::Text {
                topic: None,
                slow_mode_seconds: 10,
                nsfw: false,
            },
        }
    }

    fn engine() -> RestoreEngine {
        RestoreEngine::new(RestoreOptions::default(), RetryPolicy::none())
    }

    fn target_role_names(ws: &MemoryWorkspace) -> Vec<String> {
        ws.roles()
            .into_iter()
            .filter(|r| !r.is_default)
            .map(|r| r.name)
            .collect()
    }

    #[tokio::test]
    async fn hierarchy_survives_reverse_creation() {
        let source = MemoryWorkspace::new("source");
        source.add_role("Member", 0);
        source.add_role("VIP", 0);
        source.add_role("Mod", 0);
        source.add_role("Admin", 0);
        let snapshot = capture(&source).await;

        let target = MemoryWorkspace::new("target");
        target.add_role("Leftover", 0);
        let report = engine().restore(&snapshot, &target).await;

        assert_eq!(target_role_names(&target), ["Admin", "Mod", "VIP", "Member"]);
        assert_eq!(report.deleted_roles.succeeded, 1);
        assert_eq!(report.roles.succeeded, 4);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn one_role_failure_does_not_stop_the_rest() {
        let mut snapshot = Snapshot::new(Uuid::new_v4(), "source", Utc::now());
        snapshot.roles = vec![
            role("r1", 5),
            role("r2", 4),
            role("r3", 3),
            role("r4", 2),
            role("r5", 1),
        ];

        let target = MemoryWorkspace::new("target");
        target.deny(Operation::CreateRole, "r3");
        let report = engine().restore(&snapshot, &target).await;

        assert_eq!(report.roles.succeeded, 4);
        assert_eq!(report.roles.failed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "r3");
        assert_eq!(report.failures[0].code, "UNAUTHORIZED");
        assert_eq!(target_role_names(&target), ["r1", "r2", "r4", "r5"]);
    }

    #[tokio::test]
    async fn forbidden_deletions_are_skipped() {
        let target = MemoryWorkspace::new("target");
        target.add_role("Bot", 0);
        target.add_role("Old", 0);
        target.add_text_channel("keep-me", 0, None);
        target.add_text_channel("old-chat", 1, None);
        target.deny(Operation::DeleteRole, "Bot");
        target.deny(Operation::DeleteChannel, "keep-me");

        let snapshot = Snapshot::new(Uuid::new_v4(), "empty", Utc::now());
        let report = engine().restore(&snapshot, &target).await;

        assert_eq!(report.deleted_roles.succeeded, 1);
        assert_eq!(report.deleted_roles.failed, 1);
        assert_eq!(report.deleted_channels.succeeded, 1);
        assert_eq!(report.deleted_channels.failed, 1);
        assert!(target.channel("keep-me").is_some());
        assert!(target.channel("old-chat").is_none());
        // @everyone is never touched.
        assert!(!target
            .mutations()
            .contains(&Mutation::DeleteRole(target.default_role_id())));
    }

    #[tokio::test]
    async fn channels_follow_their_recreated_category() {
        let cat_id = Uuid::new_v4();
        let mut snapshot = Snapshot::new(Uuid::new_v4(), "source", Utc::now());
        snapshot.categories = vec![Category {
            source_id: cat_id,
            name: "Text Channels".into(),
            position: 4,
            overwrites: vec![],
        }];
        snapshot.channels = vec![text("general", Some(cat_id)), text("loose", None)];

        let target = MemoryWorkspace::new("target");
        let report = engine().restore(&snapshot, &target).await;

        let category = target.category("Text Channels").unwrap();
        assert_ne!(category.id, cat_id);
        assert_eq!(category.position, 4);
        assert_eq!(target.channel("general").unwrap().parent_id, Some(category.id));
        assert_eq!(target.channel("loose").unwrap().parent_id, None);
        assert!(report.unlinked_channels.is_empty());
    }

    #[tokio::test]
    async fn unresolved_category_leaves_channel_unlinked() {
        let cat_id = Uuid::new_v4();
        let mut snapshot = Snapshot::new(Uuid::new_v4(), "source", Utc::now());
        snapshot.categories = vec![Category {
            source_id: cat_id,
            name: "Secret".into(),
            position: 0,
            overwrites: vec![],
        }];
        snapshot.channels = vec![text("plans", Some(cat_id))];

        let target = MemoryWorkspace::new("target");
        target.deny(Operation::CreateCategory, "Secret");
        let report = engine().restore(&snapshot, &target).await;

        assert_eq!(report.categories.failed, 1);
        assert_eq!(report.channels.succeeded, 1);
        assert_eq!(report.unlinked_channels, vec!["plans".to_string()]);
        assert_eq!(target.channel("plans").unwrap().parent_id, None);
    }

    #[tokio::test]
    async fn overwrites_are_retargeted() {
        let source = MemoryWorkspace::new("source");
        let member = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let mods = source.add_role("Mod", Permissions::MANAGE_MESSAGES.bits());
        let everyone = source.default_role_id();
        let cat = source.add_category(
            "Staff",
            0,
            vec![PermissionOverwrite {
                target_id: everyone,
                target_type: OverwriteType::Role,
                allow: 0,
                deny: Permissions::VIEW_CHANNEL.bits(),
            }],
        );
        let chan = source.add_text_channel("mod-log", 0, Some(cat));
        source.set_channel_overwrites(
            chan,
            vec![
                PermissionOverwrite {
                    target_id: mods,
                    target_type: OverwriteType::Role,
                    allow: Permissions::VIEW_CHANNEL.bits(),
                    deny: 0,
                },
                PermissionOverwrite {
                    target_id: member,
                    target_type: OverwriteType::Member,
                    allow: Permissions::SEND_MESSAGES.bits(),
                    deny: Permissions::SEND_MESSAGES.bits(),
                },
                PermissionOverwrite {
                    target_id: stranger,
                    target_type: OverwriteType::Member,
                    allow: Permissions::SEND_MESSAGES.bits(),
                    deny: 0,
                },
            ],
        );
        let snapshot = capture(&source).await;

        let target = MemoryWorkspace::new("target");
        target.add_member(member);
        let report = engine().restore(&snapshot, &target).await;

        let new_mod = target.roles().into_iter().find(|r| r.name == "Mod").unwrap().id;
        let staff = target.category("Staff").unwrap();
        assert_eq!(staff.overwrites.len(), 1);
        assert_eq!(staff.overwrites[0].target_id, target.default_role_id());

        let log = target.channel("mod-log").unwrap();
        assert_eq!(log.overwrites.len(), 2);
        assert_eq!(log.overwrites[0].target_id, new_mod);
        assert_eq!(log.overwrites[1].target_id, member);
        // Overlapping planes are passed through untouched.
        assert_eq!(log.overwrites[1].allow & log.overwrites[1].deny, Permissions::SEND_MESSAGES.bits());

        assert_eq!(report.overwrites.succeeded, 3);
        assert_eq!(report.overwrites.skipped, 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn overwrites_can_be_left_alone() {
        let source = MemoryWorkspace::new("source");
        let mods = source.add_role("Mod", 0);
        source.add_category(
            "Staff",
            0,
            vec![PermissionOverwrite {
                target_id: mods,
                target_type: OverwriteType::Role,
                allow: 1,
                deny: 0,
            }],
        );
        let snapshot = capture(&source).await;

        let target = MemoryWorkspace::new("target");
        let engine = RestoreEngine::new(
            RestoreOptions {
                apply_overwrites: false,
            },
            RetryPolicy::none(),
        );
        let report = engine.restore(&snapshot, &target).await;

        assert!(target.category("Staff").unwrap().overwrites.is_empty());
        assert_eq!(report.overwrites.skipped, 1);
        assert!(!target
            .mutations()
            .iter()
            .any(|m| matches!(m, Mutation::SetOverwrites(_))));
    }

    fn role_overwrite(role: &Role) -> PermissionOverwrite {
        PermissionOverwrite {
            target_id: role.source_id.unwrap(),
            target_type: OverwriteType::Role,
            allow: Permissions::VIEW_CHANNEL.bits(),
            deny: 0,
        }
    }

    #[tokio::test]
    async fn overwrites_of_objects_never_created_count_as_skipped() {
        let mods = role("Mod", 1);
        let cat_id = Uuid::new_v4();
        let mut snapshot = Snapshot::new(Uuid::new_v4(), "source", Utc::now());
        snapshot.categories = vec![Category {
            source_id: cat_id,
            name: "Staff".into(),
            position: 0,
            overwrites: vec![role_overwrite(&mods)],
        }];
        let mut rejected = text("bad name", None);
        rejected.overwrites = vec![role_overwrite(&mods), role_overwrite(&mods)];
        let mut kept = text("general", None);
        kept.overwrites = vec![role_overwrite(&mods)];
        snapshot.channels = vec![rejected, kept];
        snapshot.roles = vec![mods];

        let target = MemoryWorkspace::new("target");
        target.deny(Operation::CreateCategory, "Staff");
        target.reject(Operation::CreateChannel, "bad name");
        let report = engine().restore(&snapshot, &target).await;

        assert_eq!(report.channels.failed, 1);
        let rejection = report.failures.iter().find(|f| f.name == "bad name").unwrap();
        assert_eq!(rejection.phase, Phase::Channels);
        assert_eq!(rejection.code, "INVALID_REQUEST");

        assert_eq!(report.overwrites.succeeded, 1);
        assert_eq!(report.overwrites.skipped, 3);
        assert_eq!(report.overwrites.failed, 0);
        assert_eq!(report.overwrites.total(), snapshot.overwrite_count());

        // Same total when overwrites are switched off.
        let target = MemoryWorkspace::new("target");
        target.deny(Operation::CreateCategory, "Staff");
        target.reject(Operation::CreateChannel, "bad name");
        let engine = RestoreEngine::new(
            RestoreOptions {
                apply_overwrites: false,
            },
            RetryPolicy::none(),
        );
        let report = engine.restore(&snapshot, &target).await;
        assert_eq!(report.overwrites.skipped, 4);
        assert_eq!(report.overwrites.total(), snapshot.overwrite_count());
    }

    #[tokio::test]
    async fn refused_overwrite_write_fails_the_whole_set() {
        let mods = role("Mod", 2);
        let admins = role("Admin", 1);
        let mut snapshot = Snapshot::new(Uuid::new_v4(), "source", Utc::now());
        let mut log = text("mod-log", None);
        log.overwrites = vec![role_overwrite(&mods), role_overwrite(&admins)];
        let mut lobby = text("lobby", None);
        lobby.overwrites = vec![role_overwrite(&mods)];
        snapshot.channels = vec![log, lobby];
        snapshot.roles = vec![mods, admins];

        let target = MemoryWorkspace::new("target");
        target.reject(Operation::SetOverwrites, "mod-log");
        let report = engine().restore(&snapshot, &target).await;

        assert_eq!(report.channels.succeeded, 2);
        assert_eq!(report.overwrites.failed, 2);
        assert_eq!(report.overwrites.succeeded, 1);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.phase, Phase::Overwrites);
        assert_eq!(failure.kind, ObjectKind::Overwrite);
        assert_eq!(failure.name, "mod-log");
        assert_eq!(failure.code, "INVALID_REQUEST");
        assert!(target.channel("mod-log").unwrap().overwrites.is_empty());
        assert_eq!(target.channel("lobby").unwrap().overwrites.len(), 1);
    }

    #[tokio::test]
    async fn member_lookup_error_skips_only_member_overwrites() {
        let mods = role("Mod", 1);
        let member = Uuid::new_v4();
        let mut snapshot = Snapshot::new(Uuid::new_v4(), "source", Utc::now());
        let mut chan = text("mod-log", None);
        chan.overwrites = vec![
            role_overwrite(&mods),
            PermissionOverwrite {
                target_id: member,
                target_type: OverwriteType::Member,
                allow: Permissions::SEND_MESSAGES.bits(),
                deny: 0,
            },
        ];
        snapshot.channels = vec![chan];
        snapshot.roles = vec![mods];

        let target = MemoryWorkspace::new("target");
        target.add_member(member);
        target.fail_listing(Operation::MemberExists);
        let report = engine().restore(&snapshot, &target).await;

        assert!(report.is_clean(), "{report}");
        assert_eq!(report.overwrites.succeeded, 1);
        assert_eq!(report.overwrites.skipped, 1);
        assert!(
            report.warnings.iter().any(|w| w.contains("member lookup")),
            "{:?}",
            report.warnings
        );
        let log = target.channel("mod-log").unwrap();
        assert_eq!(log.overwrites.len(), 1);
        assert_eq!(log.overwrites[0].target_type, OverwriteType::Role);
    }

    #[tokio::test]
    async fn emojis_are_counted_not_recreated() {
        let source = MemoryWorkspace::new("source");
        source.add_emoji("wave", Some("https://cdn.nexus.example/wave.png"));
        let snapshot = capture(&source).await;

        let target = MemoryWorkspace::new("target");
        let report = engine().restore(&snapshot, &target).await;

        assert_eq!(report.emojis_not_restored, 1);
    }
}
