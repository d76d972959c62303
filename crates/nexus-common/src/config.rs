//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the configuration from environment.
///
/// Should be called once at startup; later calls return the first result.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }

    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = defaults()?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (NEXUS_BACKUP__API__BASE_URL, NEXUS_BACKUP__API__TOKEN, etc.)
        .add_source(
            config::Environment::with_prefix("NEXUS_BACKUP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Builder pre-loaded with every default value.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("api.base_url", "http://localhost:8080/api/v1")?
        .set_default("api.timeout_secs", 30)?
        .set_default("storage.backup_dir", "backups")?
        .set_default("retry.max_attempts", 4)?
        .set_default("retry.base_delay_ms", 500)?
        .set_default("retry.max_delay_ms", 30_000)?
        .set_default("restore.apply_overwrites", true)?
        .set_default("restore.confirm_timeout_secs", 30)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub retry: RetryConfig,
    pub restore: RestoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the Nexus REST API, including the `/api/v1` prefix.
    pub base_url: String,
    /// Bot token. Optional so that offline commands (`list`, `show`) work without one.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one JSON document per backup.
    pub backup_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts per remote call, including the first one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestoreConfig {
    /// Replay category/channel permission overwrites after recreation.
    pub apply_overwrites: bool,
    /// How long the `restore` command waits for the operator to confirm.
    pub confirm_timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let cfg: AppConfig = defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.storage.backup_dir, "backups");
        assert_eq!(cfg.retry.max_attempts, 4);
        assert!(cfg.restore.apply_overwrites);
        assert!(cfg.api.token.is_none());
    }

    #[test]
    fn overrides_take_precedence() {
        let cfg: AppConfig = defaults()
            .unwrap()
            .set_override("restore.apply_overwrites", false)
            .unwrap()
            .set_override("api.token", "Bot abc")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert!(!cfg.restore.apply_overwrites);
        assert_eq!(cfg.api.token.as_deref(), Some("Bot abc"));
    }
}
