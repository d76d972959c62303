//! Centralized error types for Nexus backups.
//!
//! Uses `thiserror` for ergonomic error definitions. The variants follow the
//! failure classes the backup engine distinguishes: object-level failures that
//! a capture or restore loop records and skips, transient remote failures that
//! the retry hook may replay, and fatal store/parse failures that abort the
//! whole operation.

/// Core error type used across all Nexus backup crates.
#[derive(Debug, thiserror::Error)]
pub enum NexusError {
    // === Remote object errors ===
    #[error("Unauthorized: {action}")]
    Unauthorized { action: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // === Snapshot errors ===
    #[error("Malformed snapshot: {message}")]
    MalformedSnapshot { message: String },

    // === Transient remote failures ===
    #[error("Rate limited. Retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Remote unavailable: {message}")]
    Transient { message: String },

    // === Coordination ===
    #[error("{resource} is busy")]
    Busy { resource: String },

    // === Infrastructure errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl NexusError {
    pub fn unauthorized(action: impl Into<String>) -> Self {
        Self::Unauthorized {
            action: action.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            message: message.into(),
        }
    }

    /// Map an HTTP status returned by the Nexus API onto the error taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized { action: message },
            404 => Self::NotFound { resource: message },
            429 => Self::RateLimited { retry_after_ms: 1_000 },
            408 => Self::Transient {
                message: format!("HTTP {status}: {message}"),
            },
            400..=499 => Self::InvalidRequest { message },
            _ => Self::Transient {
                message: format!("HTTP {status}: {message}"),
            },
        }
    }

    /// Whether the failure is worth replaying after a delay.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transient { .. })
    }

    /// Error code string for reports and programmatic handling.
    pub fn error_code(&self) -> &str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::MalformedSnapshot { .. } => "MALFORMED_SNAPSHOT",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Transient { .. } => "TRANSIENT_REMOTE_FAILURE",
            Self::Busy { .. } => "BUSY",
            Self::Io(_) => "IO_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convenience type alias for Results using NexusError.
pub type NexusResult<T> = Result<T, NexusError>;
