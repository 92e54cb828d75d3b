//! # API Error Type
//!
//! Unified error type for CLI commands: every layer's error becomes a
//! machine-readable `code` plus the notice shown to the user.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in MediRoom                               │
//! │                                                                         │
//! │  Command Function                                                      │
//! │  Result<T, ApiError>                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Validation Error? ─── ValidationError::Required ──┐                   │
//! │         │                                           │                   │
//! │         ▼                                           ▼                   │
//! │  Booking Error? ────── CoreError::UnknownDoctor ── ApiError ──► stderr │
//! │         │                                           ▲      (or JSON)    │
//! │         ▼                                           │                   │
//! │  Storage Error? ────── StoreError::Db(..) ──────────┘                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Success ──────────────────────────────────────────────────► stdout    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use mediroom_core::{CoreError, ValidationError};
use mediroom_db::DbError;
use mediroom_store::StoreError;

/// Error returned from CLI commands.
///
/// ## Serialization
/// With `--json`, a failed command prints:
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Review cannot be empty."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable notice for display
    pub message: String,
}

/// Error codes for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed
    ValidationError,

    /// Doctor or slot not offered
    NotFound,

    /// Storage medium can't be reached
    StorageUnavailable,

    /// Database operation failed
    DatabaseError,

    /// Configuration file or values are invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::ValidationError | ErrorCode::NotFound => 2,
            ErrorCode::ConfigError => 3,
            ErrorCode::StorageUnavailable | ErrorCode::DatabaseError => 4,
            ErrorCode::Internal => 1,
        }
    }
}

/// Converts validation errors to user-facing notices.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let message = match &err {
            ValidationError::Required { field } => format!("{} is required.", capitalize(field)),
            ValidationError::TooLong { field, max } => {
                format!("{} must be at most {} characters.", capitalize(field), max)
            }
            ValidationError::InvalidFormat { field, reason } => {
                format!("{} is invalid: {}.", capitalize(field), reason)
            }
        };
        ApiError::validation(message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownDoctor(name) => {
                ApiError::new(ErrorCode::NotFound, format!("Doctor not found: {}", name))
            }
            CoreError::SlotUnavailable { doctor, time } => ApiError::new(
                ErrorCode::NotFound,
                format!("{} has no slot at {}", doctor, time),
            ),
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::StorageUnavailable(e) => {
                tracing::error!("Storage unavailable: {}", e);
                ApiError::new(
                    ErrorCode::StorageUnavailable,
                    "Storage is unavailable. Check the database path and free space.",
                )
            }
            DbError::NoMigrationPath { found, latest } => ApiError::new(
                ErrorCode::DatabaseError,
                format!(
                    "Database was created by a newer version (schema {}, this build supports {})",
                    found, latest
                ),
            ),
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::ConstraintViolation { table, detail } => {
                tracing::error!(table = %table, "Constraint violation: {}", detail);
                ApiError::new(ErrorCode::DatabaseError, "The record could not be saved")
            }
            DbError::DecodeFailure { column, reason } => {
                tracing::error!(column = %column, "Decode failure: {}", reason);
                ApiError::new(ErrorCode::DatabaseError, "Stored data could not be read")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Db(e) => e.into(),
            StoreError::Closed => ApiError::internal("Store is shutting down"),
            StoreError::InvalidConfig(e)
            | StoreError::ConfigLoadFailed(e)
            | StoreError::ConfigSaveFailed(e) => ApiError::new(ErrorCode::ConfigError, e),
        }
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}
