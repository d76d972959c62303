//! # nexus-backup
//!
//! Snapshot and restore engine for Nexus server structure: roles, categories,
//! channels, permission overwrites and custom emoji references.
//!
//! ```rust,no_run
//! use nexus_backup::{BackupService, FileBackupStore, RestoreOptions, RetryPolicy};
//! use nexus_backup::memory::MemoryWorkspace;
//!
//! #[tokio::main]
//! async fn main() -> nexus_common::error::NexusResult<()> {
//!     let service = BackupService::new(
//!         FileBackupStore::new("backups"),
//!         RetryPolicy::default(),
//!         RestoreOptions::default(),
//!     );
//!     let server = MemoryWorkspace::new("My Server");
//!
//!     let (id, _snapshot) = service.backup(&server).await?;
//!     let report = service.restore(&id, &server).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod codec;
pub mod gate;
pub mod memory;
pub mod report;
pub mod restore;
pub mod retry;
pub mod service;
pub mod store;
pub mod workspace;

pub use capture::{capture, CaptureEngine};
pub use gate::{GateGuard, RestoreGate};
pub use report::{ObjectFailure, ObjectKind, Phase, RestoreReport, Tally};
pub use restore::{RestoreEngine, RestoreOptions};
pub use retry::RetryPolicy;
pub use service::BackupService;
pub use store::{BackupId, BackupInfo, BackupStore, FileBackupStore};
pub use workspace::{
    RemoteCategory, RemoteChannel, RemoteChannelKind, RemoteEmoji, RemoteRole, WorkspaceAccessor,
    WorkspaceInfo, WorkspaceMutator,
};
