//! Snapshot models shared across the backup crates.
//!
//! These are the "truth" types: what a backup document stores and what the
//! restore engine replays. IDs are the source server's UUIDs.

pub mod channel;
pub mod role;
pub mod snapshot;

/// Re-export all model types for convenience.
pub use channel::*;
pub use role::*;
pub use snapshot::*;
