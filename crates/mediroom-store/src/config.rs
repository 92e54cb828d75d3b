//! # Store Configuration
//!
//! Where the database lives and how the stores behave.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEDIROOM_DB_PATH=/data/mediroom.db                                 │
//! │     MEDIROOM_MAX_CONNECTIONS=4                                         │
//! │     MEDIROOM_OP_TIMEOUT_MS=5000                                        │
//! │     MEDIROOM_WRITE_QUEUE=64                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/mediroom/mediroom.toml (Linux)                           │
//! │     ~/Library/Application Support/com.victory.mediroom/mediroom.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     <platform data dir>/mediroom.db                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/mediroom/mediroom.db"
//! max_connections = 4
//! operation_timeout_ms = 5000
//!
//! [store]
//! write_queue_capacity = 64
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use mediroom_db::DbConfig;

use crate::error::{StoreError, StoreResult};
use crate::live::DEFAULT_QUEUE_CAPACITY;

const CONFIG_FILE: &str = "mediroom.toml";
const DATABASE_FILE: &str = "mediroom.db";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "victory", "mediroom")
}

// =============================================================================
// Database Settings
// =============================================================================

/// Storage location and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file path.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Upper bound on a single insert or query (milliseconds).
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

fn default_max_connections() -> u32 {
    4
}

fn default_operation_timeout() -> u64 {
    5000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            operation_timeout_ms: default_operation_timeout(),
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Snapshot wrapper behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Saves that may wait in each store's queue.
    #[serde(default = "default_write_queue")]
    pub write_queue_capacity: usize,
}

fn default_write_queue() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            write_queue_capacity: default_write_queue(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (mediroom.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::ConfigSaveFailed(format!("{}: {}", parent.display(), e)))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| StoreError::ConfigSaveFailed(format!("{}: {}", path.display(), e)))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(StoreError::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.operation_timeout_ms == 0 {
            return Err(StoreError::InvalidConfig(
                "database.operation_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.store.write_queue_capacity == 0 {
            return Err(StoreError::InvalidConfig(
                "store.write_queue_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("MEDIROOM_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("MEDIROOM_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid MEDIROOM_MAX_CONNECTIONS"),
            }
        }

        if let Ok(timeout) = std::env::var("MEDIROOM_OP_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.database.operation_timeout_ms = ms,
                Err(_) => warn!(value = %timeout, "Ignoring invalid MEDIROOM_OP_TIMEOUT_MS"),
            }
        }

        if let Ok(capacity) = std::env::var("MEDIROOM_WRITE_QUEUE") {
            match capacity.parse::<usize>() {
                Ok(n) => self.store.write_queue_capacity = n,
                Err(_) => warn!(value = %capacity, "Ignoring invalid MEDIROOM_WRITE_QUEUE"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Builds the database layer's configuration.
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .operation_timeout(self.operation_timeout())
    }

    /// Operation timeout as a duration.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.database.operation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.database.operation_timeout_ms, 5000);
        assert_eq!(config.store.write_queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.database.path.ends_with(DATABASE_FILE));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 2;
        config.store.write_queue_capacity = 0;
        assert!(config.validate().is_err());

        config.store.write_queue_capacity = 1;
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            [database]
            path = "/tmp/clinic.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/clinic.db"));
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.store.write_queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = StoreConfig::default();
        config.database.path = dir.path().join("ward.db");
        config.store.write_queue_capacity = 7;
        config.save(Some(path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[database]"));
        assert!(text.contains("[store]"));

        let parsed: StoreConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.store.write_queue_capacity, 7);
        assert_eq!(parsed.database.path, dir.path().join("ward.db"));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[database\npath = ").unwrap();

        let err = StoreConfig::load(Some(path)).unwrap_err();
        assert!(matches!(err, StoreError::ConfigLoadFailed(_)));
    }

    #[test]
    fn test_save_under_a_file_is_save_error() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let path = blocker.path().join(CONFIG_FILE);

        let err = StoreConfig::default().save(Some(path)).unwrap_err();
        assert!(matches!(err, StoreError::ConfigSaveFailed(_)), "{err:?}");
    }

    // The only test in this crate that touches MEDIROOM_* variables
    #[test]
    fn test_env_overrides() {
        const VARS: [(&str, &str); 4] = [
            ("MEDIROOM_DB_PATH", "/tmp/env-ward.db"),
            ("MEDIROOM_MAX_CONNECTIONS", "many"),
            ("MEDIROOM_OP_TIMEOUT_MS", "750"),
            ("MEDIROOM_WRITE_QUEUE", "12"),
        ];
        for (key, value) in VARS {
            std::env::set_var(key, value);
        }

        let mut config = StoreConfig::default();
        config.apply_env_overrides();

        for (key, _) in VARS {
            std::env::remove_var(key);
        }

        assert_eq!(config.database.path, PathBuf::from("/tmp/env-ward.db"));
        // Unparseable values are ignored
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.database.operation_timeout_ms, 750);
        assert_eq!(config.store.write_queue_capacity, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_to_db_config() {
        let mut config = StoreConfig::default();
        config.database.path = PathBuf::from("/tmp/x.db");
        config.database.max_connections = 2;
        config.database.operation_timeout_ms = 250;

        let db = config.to_db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(db.max_connections, 2);
        assert_eq!(db.operation_timeout, Duration::from_millis(250));
    }
}
