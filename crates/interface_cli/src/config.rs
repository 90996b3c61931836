//! CLI configuration

use std::path::PathBuf;

use core_kernel::DecodePolicy;
use infra_db::PoolConfig;
use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;

/// Environment variable prefix, e.g. `RECORDS_DATABASE_PATH`
pub const ENV_PREFIX: &str = "RECORDS";

/// Optional configuration file in the working directory, without extension
pub const CONFIG_FILE: &str = "recordctl";

/// CLI configuration
///
/// Nested pool settings use a double underscore:
/// `RECORDS_POOL__MAX_CONNECTIONS=4`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Connection pool settings
    pub pool: PoolConfig,
    /// How long a statement waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// Fail on rows that do not match the entity types instead of defaulting
    pub strict_decode: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("records.db"),
            pool: PoolConfig::new().max_connections(4).min_connections(1),
            busy_timeout_ms: 5_000,
            log_level: "warn".to_string(),
            json_logs: false,
            strict_decode: false,
        }
    }
}

impl CliConfig {
    /// Loads configuration from `recordctl.{toml,yaml,json}` if present,
    /// then from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Configuration builder seeded with the CLI defaults
    ///
    /// Seeding every pool key keeps a partially configured pool block on
    /// these values rather than on the library's `PoolConfig::default()`.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let defaults = Self::default();
        let timeout_ms = i64::try_from(defaults.pool.acquire_timeout_ms).unwrap_or(i64::MAX);
        config::Config::builder()
            .set_default("pool.max_connections", i64::from(defaults.pool.max_connections))?
            .set_default("pool.min_connections", i64::from(defaults.pool.min_connections))?
            .set_default("pool.acquire_timeout_ms", timeout_ms)
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        if self.strict_decode {
            DecodePolicy::FailFast
        } else {
            DecodePolicy::BestEffort
        }
    }

    pub fn busy_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.database_path, PathBuf::from("records.db"));
        assert_eq!(config.pool.max_connections, 4);
        assert_eq!(config.decode_policy(), DecodePolicy::BestEffort);
    }

    #[test]
    fn test_strict_decode_policy() {
        let config = CliConfig {
            strict_decode: true,
            ..CliConfig::default()
        };
        assert_eq!(config.decode_policy(), DecodePolicy::FailFast);
    }

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: CliConfig = CliConfig::builder()
            .unwrap()
            .set_override("database_path", "/tmp/other.db")
            .unwrap()
            .set_override("pool.max_connections", 8)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.pool.max_connections, 8);
        assert_eq!(config.pool.min_connections, 1);
        assert_eq!(config.pool.acquire_timeout_ms, 30_000);
        assert_eq!(config.busy_timeout_ms, 5_000);
    }

    #[test]
    fn test_single_connection_pool_is_valid() {
        let config: CliConfig = CliConfig::builder()
            .unwrap()
            .set_override("pool.max_connections", 1)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.pool.max_connections, 1);
        assert_eq!(config.pool.min_connections, 1);
        let pool = infra_db::ConnectionPool::new(
            config.pool,
            infra_db::SqliteConnectionFactory::in_memory(),
            std::sync::Arc::new(core_kernel::MemorySink::new()),
        );
        assert!(pool.is_ok());
    }

    #[test]
    fn test_empty_source_matches_defaults() {
        let config: CliConfig = CliConfig::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config, CliConfig::default());
    }
}
