//! # Database Error Types
//!
//! Error types for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error) / timeout                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Categorized: unavailable / constraint /       │
//! │       │                  decode / migration                            │
//! │       ▼                                                                 │
//! │  StoreError (mediroom-store) ← Save ticket outcome                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (CLI) ← User-visible notice                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries. A failure propagates once to the immediate caller.

use std::time::Duration;

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The storage medium cannot be reached.
    ///
    /// ## When This Occurs
    /// - Database file can't be created or opened (permissions, bad path)
    /// - Disk full or read-only medium
    /// - Pool closed or exhausted
    /// - An operation exceeded its timeout
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A constraint rejected the write.
    ///
    /// Identity collisions never land here: REPLACE tables overwrite and
    /// IGNORE tables report [`crate::InsertOutcome::Ignored`].
    #[error("Constraint violation on {table}: {detail}")]
    ConstraintViolation { table: String, detail: String },

    /// A stored value could not be decoded into its Rust type.
    #[error("Failed to decode {column}: {reason}")]
    DecodeFailure { column: String, reason: String },

    /// Migration failed.
    ///
    /// ## When This Occurs
    /// - Invalid SQL in migration
    /// - An applied migration's checksum no longer matches
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The database was written by a newer schema this build can't migrate from.
    #[error("No migration path: database has version {found}, this build knows up to {latest}")]
    NoMigrationPath { found: i64, latest: i64 },

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a StorageUnavailable error for an operation that ran too long.
    pub fn timed_out(operation: &str, after: Duration) -> Self {
        DbError::StorageUnavailable(format!("{} timed out after {:?}", operation, after))
    }

    /// Returns true for failures of the medium itself.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, DbError::StorageUnavailable(_))
    }
}

/// SQLite primary result codes that mean the medium itself is unusable.
///
/// SQLITE_PERM (3), SQLITE_READONLY (8), SQLITE_IOERR (10), SQLITE_CORRUPT (11),
/// SQLITE_FULL (13), SQLITE_CANTOPEN (14), SQLITE_NOTADB (26).
const UNAVAILABLE_CODES: &[i64] = &[3, 8, 10, 11, 13, 14, 26];

fn is_unavailable_code(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i64>().ok())
        // Extended codes carry the primary code in the low byte
        .map(|c| UNAVAILABLE_CODES.contains(&(c & 0xFF)))
        .unwrap_or(false)
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database (I/O codes)     → DbError::StorageUnavailable
/// sqlx::Error::Database (constraint)    → DbError::ConstraintViolation
/// sqlx::Error::Io / PoolTimedOut / ...  → DbError::StorageUnavailable
/// sqlx::Error::ColumnDecode / Decode    → DbError::DecodeFailure
/// Other                                 → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                if is_unavailable_code(db_err.code().as_deref()) {
                    return DbError::StorageUnavailable(msg);
                }

                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation
                    | sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation
                    | sqlx::error::ErrorKind::ForeignKeyViolation => {
                        // SQLite formats these as "<KIND> constraint failed: <table>.<column>"
                        let table = msg
                            .split(": ")
                            .nth(1)
                            .and_then(|target| target.split('.').next())
                            .unwrap_or("unknown")
                            .to_string();
                        DbError::ConstraintViolation { table, detail: msg }
                    }
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::Io(e) => DbError::StorageUnavailable(e.to_string()),

            sqlx::Error::PoolTimedOut => {
                DbError::StorageUnavailable("Connection pool exhausted".to_string())
            }

            sqlx::Error::PoolClosed => DbError::StorageUnavailable("Pool is closed".to_string()),

            sqlx::Error::WorkerCrashed => {
                DbError::StorageUnavailable("SQLite worker crashed".to_string())
            }

            sqlx::Error::ColumnDecode { index, source } => DbError::DecodeFailure {
                column: index,
                reason: source.to_string(),
            },

            sqlx::Error::Decode(source) => DbError::DecodeFailure {
                column: "unknown".to_string(),
                reason: source.to_string(),
            },

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        match err {
            sqlx::migrate::MigrateError::VersionMissing(found) => DbError::NoMigrationPath {
                found,
                latest: crate::migrations::latest_version(),
            },
            sqlx::migrate::MigrateError::Execute(e) => match DbError::from(e) {
                unavailable @ DbError::StorageUnavailable(_) => unavailable,
                other => DbError::MigrationFailed(other.to_string()),
            },
            other => DbError::MigrationFailed(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
