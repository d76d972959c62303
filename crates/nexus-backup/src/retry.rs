//! Retry hook for transient remote failures.
//!
//! Rate limits and unavailable upstreams are replayed with exponential backoff.
//! Anything else (unauthorized, invalid, not found) is returned on the first
//! attempt so the engine can record it and move on.

use std::future::Future;
use std::time::Duration;

use nexus_common::{
    config::RetryConfig,
    error::{NexusError, NexusResult},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never less than 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no replay.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, after `attempt` failures.
    fn delay_for(&self, attempt: u32, err: &NexusError) -> Duration {
        let backoff = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
        let delay = match err {
            NexusError::RateLimited { retry_after_ms } => {
                backoff.max(Duration::from_millis(*retry_after_ms))
            }
            _ => backoff,
        };
        delay.min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> NexusResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = NexusResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(e) if e.is_transient() && attempt < self.max_attempts.max(1) => {
                    let delay = self.delay_for(attempt, &e);
                    debug!(what, attempt, ?delay, error = %e, "retrying transient failure");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
