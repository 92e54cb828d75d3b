//! # Store Error Types
//!
//! Errors surfaced by the observable stores and their configuration.

use thiserror::Error;

use mediroom_db::DbError;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Storage
    // =========================================================================
    /// The write reached storage and failed there.
    #[error(transparent)]
    Db(#[from] DbError),

    /// The store has been shut down; the save was not queued.
    #[error("Store is shut down")]
    Closed,

    // =========================================================================
    // Configuration
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl StoreError {
    /// Returns true if the underlying medium was unreachable.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, StoreError::Db(e) if e.is_storage_unavailable())
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = StoreError::from(DbError::StorageUnavailable("disk full".into()));
        assert!(err.is_storage_unavailable());
        assert_eq!(err.to_string(), "Storage unavailable: disk full");

        assert!(!StoreError::Closed.is_storage_unavailable());
    }
}
