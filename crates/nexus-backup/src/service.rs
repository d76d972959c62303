//! Backup service tying capture, encoding, storage and restore together.
//!
//! Write path: capture → serialize → store.
//! Read path: store → deserialize → restore.
//!
//! A restore loads and decodes the document before touching the target, so a
//! missing or unreadable backup fails without a single mutation.

use nexus_common::{error::NexusResult, models::Snapshot};
use tracing::info;
use uuid::Uuid;

use crate::capture::CaptureEngine;
use crate::codec;
use crate::report::RestoreReport;
use crate::restore::{RestoreEngine, RestoreOptions};
use crate::retry::RetryPolicy;
use crate::store::{BackupId, BackupInfo, BackupStore};
use crate::workspace::{WorkspaceAccessor, WorkspaceMutator};

pub struct BackupService<S> {
    store: S,
    capture: CaptureEngine,
    restore: RestoreEngine,
}

impl<S: BackupStore> BackupService<S> {
    pub fn new(store: S, retry: RetryPolicy, options: RestoreOptions) -> Self {
        Self {
            store,
            capture: CaptureEngine::new(retry),
            restore: RestoreEngine::new(options, retry),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Capture the server behind `accessor` and store it.
    pub async fn backup<A>(&self, accessor: &A) -> NexusResult<(BackupId, Snapshot)>
    where
        A: WorkspaceAccessor + ?Sized,
    {
        let snapshot = self.capture.capture(accessor).await;
        let document = codec::serialize(&snapshot)?;
        let id = self
            .store
            .save(snapshot.workspace_id, snapshot.captured_at, &document)
            .await?;
        info!(backup = %id, "backup created");
        Ok((id, snapshot))
    }

    /// Load and decode a stored snapshot.
    pub async fn load(&self, id: &BackupId) -> NexusResult<Snapshot> {
        let document = self.store.load(id).await?;
        codec::deserialize(&document)
    }

    /// Restore a stored snapshot onto `target`.
    ///
    /// Fails only when the backup cannot be loaded or decoded, and then before
    /// any call reaches the target.
    pub async fn restore<M>(&self, id: &BackupId, target: &M) -> NexusResult<RestoreReport>
    where
        M: WorkspaceMutator + ?Sized,
    {
        let snapshot = self.load(id).await?;
        Ok(self.restore_snapshot(&snapshot, target).await)
    }

    /// Restore an already loaded snapshot.
    pub async fn restore_snapshot<M>(&self, snapshot: &Snapshot, target: &M) -> RestoreReport
    where
        M: WorkspaceMutator + ?Sized,
    {
        self.restore.restore(snapshot, target).await
    }

    pub async fn list(&self, workspace_id: Option<Uuid>) -> NexusResult<Vec<BackupInfo>> {
        self.store.list(workspace_id).await
    }
}
