//! Structured outcome of a restore run.
//!
//! Callers get per-phase counts and the list of objects that failed instead of
//! a bare success flag, so a partial restore can be shown for what it is.

use std::fmt;

use nexus_common::error::NexusError;
use serde::Serialize;

/// Outcome counts for one kind of object.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub succeeded: usize,
    /// Not attempted on purpose (e.g. an overwrite whose target is gone)
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ok, {} skipped, {} failed",
            self.succeeded, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Clear,
    Roles,
    Categories,
    Channels,
    Overwrites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Role,
    Category,
    Channel,
    Overwrite,
}

/// One object the restore could not handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectFailure {
    pub phase: Phase,
    pub kind: ObjectKind,
    pub name: String,
    /// Stable error code, see [`NexusError::error_code`]
    pub code: String,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub deleted_roles: Tally,
    pub deleted_channels: Tally,
    pub roles: Tally,
    pub categories: Tally,
    pub channels: Tally,
    pub overwrites: Tally,
    /// Channels created without their category because it could not be resolved
    pub unlinked_channels: Vec<String>,
    pub failures: Vec<ObjectFailure>,
    pub warnings: Vec<String>,
    /// Emojis are stored by URL only and are never recreated
    pub emojis_not_restored: usize,
}

impl RestoreReport {
    /// True when no object failed. Skips and warnings do not count.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn fail(&mut self, phase: Phase, kind: ObjectKind, name: &str, err: &NexusError) {
        tracing::warn!(?phase, ?kind, name, error = %err, "restore step failed");
        self.failures.push(ObjectFailure {
            phase,
            kind,
            name: name.to_owned(),
            code: err.error_code().to_owned(),
            message: err.to_string(),
        });
    }

    pub(crate) fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

impl fmt::Display for RestoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deleted roles:    {}", self.deleted_roles)?;
        writeln!(f, "Deleted channels: {}", self.deleted_channels)?;
        writeln!(f, "Roles:            {}", self.roles)?;
        writeln!(f, "Categories:       {}", self.categories)?;
        writeln!(f, "Channels:         {}", self.channels)?;
        writeln!(f, "Overwrites:       {}", self.overwrites)?;
        if self.emojis_not_restored > 0 {
            writeln!(
                f,
                "Emojis:           {} not restored (stored by URL only)",
                self.emojis_not_restored
            )?;
        }
        for name in &self.unlinked_channels {
            writeln!(f, "  unlinked: #{name} (category missing)")?;
        }
        for failure in &self.failures {
            writeln!(
                f,
                "  failed: {:?} '{}' [{}] {}",
                failure.kind, failure.name, failure.code, failure.message
            )?;
        }
        for warning in &self.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        Ok(())
    }
}
