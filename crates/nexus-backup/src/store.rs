//! Backup store. One document per backup, keyed by server and capture time.
//!
//! Keys look like `{workspace_id}_{unix_seconds}`; the file-backed store keeps
//! each document at `<dir>/<key>.json`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_common::error::{NexusError, NexusResult};
use serde::{Serialize, Serializer};
use tracing::{debug, info};
use uuid::Uuid;

const EXTENSION: &str = "json";

/// Identity of a stored backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackupId {
    pub workspace_id: Uuid,
    /// Capture time in Unix seconds
    pub timestamp: i64,
}

impl BackupId {
    pub fn new(workspace_id: Uuid, captured_at: DateTime<Utc>) -> Self {
        Self {
            workspace_id,
            timestamp: captured_at.timestamp(),
        }
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    fn file_name(&self) -> String {
        format!("{self}.{EXTENSION}")
    }
}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.workspace_id, self.timestamp)
    }
}

impl FromStr for BackupId {
    type Err = NexusError;

    /// Accepts the bare key or the file name (`<key>.json`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.strip_suffix(".json").unwrap_or(s);
        let invalid = || NexusError::invalid(format!("'{s}' is not a backup ID"));
        let (workspace, timestamp) = key.split_once('_').ok_or_else(invalid)?;
        Ok(Self {
            workspace_id: Uuid::parse_str(workspace).map_err(|_| invalid())?,
            timestamp: timestamp.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for BackupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A stored backup as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub id: BackupId,
    pub size_bytes: u64,
}

#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Store a document and return the key it was stored under.
    async fn save(
        &self,
        workspace_id: Uuid,
        captured_at: DateTime<Utc>,
        document: &[u8],
    ) -> NexusResult<BackupId>;

    /// Fails with `NotFound` when no such backup exists.
    async fn load(&self, id: &BackupId) -> NexusResult<Vec<u8>>;

    /// Newest first, optionally restricted to one server.
    async fn list(&self, workspace_id: Option<Uuid>) -> NexusResult<Vec<BackupInfo>>;
}

/// Stores backups as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileBackupStore {
    dir: PathBuf,
}

impl FileBackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, id: &BackupId) -> PathBuf {
        self.dir.join(id.file_name())
    }
}

#[async_trait]
impl BackupStore for FileBackupStore {
    async fn save(
        &self,
        workspace_id: Uuid,
        captured_at: DateTime<Utc>,
        document: &[u8],
    ) -> NexusResult<BackupId> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let id = BackupId::new(workspace_id, captured_at);
        let path = self.path_of(&id);
        // Write next to the target and rename, so a crash never leaves half a document.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, document).await?;
        tokio::fs::rename(&tmp, &path).await?;

        info!(backup = %id, path = %path.display(), bytes = document.len(), "backup written");
        Ok(id)
    }

    async fn load(&self, id: &BackupId) -> NexusResult<Vec<u8>> {
        let path = self.path_of(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(backup = %id, bytes = bytes.len(), "backup read");
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(NexusError::not_found(format!("Backup {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, workspace_id: Option<Uuid>) -> NexusResult<Vec<BackupInfo>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<BackupId>().ok())
            else {
                continue;
            };
            if workspace_id.is_some_and(|ws| ws != id.workspace_id) {
                continue;
            }
            let size_bytes = entry.metadata().await?.len();
            backups.push(BackupInfo { id, size_bytes });
        }

        backups.sort_by(|a, b| {
            b.id.timestamp
                .cmp(&a.id.timestamp)
                .then(a.id.workspace_id.cmp(&b.id.workspace_id))
        });
        Ok(backups)
    }
}
