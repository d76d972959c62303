//! Per-server mutual exclusion for restores.
//!
//! Two restores interleaving on the same server would fight over its roles and
//! channels, and the engine does not guard against that itself. The claim is a
//! lock file created exclusively next to the backups, so it holds across
//! processes sharing a backup directory. Callers keep the [`GateGuard`] for the
//! duration of a restore.
//!
//! A process killed mid-restore leaves its lock file behind; the `Busy` error
//! names the file so an operator can remove it.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use nexus_common::error::{NexusError, NexusResult};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RestoreGate {
    dir: PathBuf,
}

impl RestoreGate {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn lock_path(&self, workspace_id: Uuid) -> PathBuf {
        self.dir.join(format!("{workspace_id}.restore.lock"))
    }

    /// Claim `workspace_id`, or fail with `Busy` if a restore already holds it.
    pub fn try_acquire(&self, workspace_id: Uuid) -> NexusResult<GateGuard> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.lock_path(workspace_id);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(NexusError::Busy {
                    resource: format!("Server {workspace_id} (lock {})", path.display()),
                });
            }
            Err(e) => return Err(e.into()),
        };
        // The owner's pid, for whoever finds a stale lock.
        let _ = writeln!(file, "{}", std::process::id());
        debug!(server = %workspace_id, lock = %path.display(), "restore gate acquired");
        Ok(GateGuard { path })
    }
}

/// Releases the server when dropped.
#[derive(Debug)]
pub struct GateGuard {
    path: PathBuf,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
