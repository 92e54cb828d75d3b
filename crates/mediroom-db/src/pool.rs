//! # Storage Handle
//!
//! Connection pool creation and configuration for SQLite, and the
//! process-wide shared handle.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storage Handle Lifecycle                           │
//! │                                                                         │
//! │  First caller(s)                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::shared(config) ← OnceCell: concurrent callers wait for      │
//! │       │                      ONE initialisation, then share it          │
//! │       ▼                                                                 │
//! │  Database::new(config)  ← pool + pragmas + migrations                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │  (max_connections)        │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│       │                           │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.appointments() / db.gallery() / db.profile() / db.reviews()        │
//! │  (accessors own all SQL; callers never touch the pool)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pragmas
//! - WAL journal: readers don't block the writer
//! - FULL synchronous: an insert is on disk when it returns
//! - Foreign keys on (unused today, kept on for future tables)

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::changes::{ChangeFeed, Table};
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::appointment::AppointmentRepository;
use crate::repository::gallery::GalleryRepository;
use crate::repository::profile::ProfileRepository;
use crate::repository::review::ReviewRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/mediroom.db")
///     .max_connections(4)
///     .operation_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 4
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection acquire timeout.
    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// Upper bound on any single insert or query.
    /// Default: 5 seconds
    pub operation_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Created if it doesn't exist;
    ///   its parent directory must already exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            operation_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the per-operation timeout.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Each call yields an isolated database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Returns true for an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let base = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::StorageUnavailable(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
        };

        Ok(base
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .foreign_keys(true))
    }
}

// =============================================================================
// Database
// =============================================================================

static SHARED: OnceCell<Database> = OnceCell::const_new();

/// Main database handle providing table accessor access.
///
/// Cloning is cheap: clones share the pool and the change feed, so an
/// insert through one clone wakes live queries opened through another.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Change counters for live queries.
    changes: Arc<ChangeFeed>,

    /// Upper bound on any single operation.
    operation_timeout: Duration,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Applies pragmas (WAL, FULL synchronous, foreign keys)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError::StorageUnavailable)` - The medium can't be opened
    /// * `Err(DbError::NoMigrationPath)` - The file was written by a newer build
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            changes: Arc::new(ChangeFeed::new()),
            operation_timeout: config.operation_timeout,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Returns the process-wide database handle, creating it on first use.
    ///
    /// Concurrent first callers wait for a single initialisation and all
    /// receive the same instance. If initialisation fails, the error goes to
    /// the callers that were waiting and the next call tries again.
    ///
    /// The first successful caller's `config` wins; later configs are ignored.
    pub async fn shared(config: DbConfig) -> DbResult<&'static Database> {
        let path = config.database_path.clone();
        let db = SHARED
            .get_or_try_init(|| async move { Database::new(config).await })
            .await?;

        if db.database_path().as_deref() != Some(path.as_path()) && path != Path::new(IN_MEMORY) {
            warn!(
                requested = %path.display(),
                "Shared database already initialised with a different path"
            );
        }

        Ok(db)
    }

    /// Returns the process-wide handle if it has been created.
    pub fn try_shared() -> Option<&'static Database> {
        SHARED.get()
    }

    /// Runs database migrations.
    ///
    /// Idempotent: already-applied versions are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Highest applied schema version, or `None` for a fresh file.
    pub async fn schema_version(&self) -> DbResult<Option<i64>> {
        migrations::schema_version(&self.pool).await
    }

    /// Embedded vs applied migration counts (for diagnostics).
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// Crate-internal: table accessors own every SQL statement.
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the change feed.
    pub fn changes(&self) -> &Arc<ChangeFeed> {
        &self.changes
    }

    /// Per-operation timeout applied by every accessor.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Runs `op` under the operation timeout.
    ///
    /// Expiry surfaces as [`DbError::StorageUnavailable`].
    pub(crate) async fn bounded<T, F>(&self, operation: &str, op: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        bounded(self.operation_timeout, operation, op).await
    }

    /// Returns the appointment accessor.
    pub fn appointments(&self) -> AppointmentRepository {
        AppointmentRepository::new(self.clone())
    }

    /// Returns the gallery accessor.
    pub fn gallery(&self) -> GalleryRepository {
        GalleryRepository::new(self.clone())
    }

    /// Returns the profile accessor.
    pub fn profile(&self) -> ProfileRepository {
        ProfileRepository::new(self.clone())
    }

    /// Returns the review accessor.
    pub fn reviews(&self) -> ReviewRepository {
        ReviewRepository::new(self.clone())
    }

    /// Counts the rows of a table (for diagnostics).
    pub async fn count(&self, table: Table) -> DbResult<i64> {
        // Table names come from a closed enum, never from input
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        self.bounded("count", async {
            let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
            Ok(count)
        })
        .await
    }

    /// Returns the on-disk path of the main database file, if any.
    pub fn database_path(&self) -> Option<PathBuf> {
        let filename = self.pool.connect_options().get_filename().to_path_buf();
        if filename.as_os_str().is_empty() || filename.to_string_lossy().contains("in-memory") {
            None
        } else {
            Some(filename)
        }
    }

    /// Closes the database connection pool.
    ///
    /// ## Note
    /// After calling close, every accessor operation fails with
    /// `StorageUnavailable`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Returns true once [`Database::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        self.bounded("health check", async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
        .is_ok()
    }
}

/// Runs `op` under `limit`, mapping expiry to `StorageUnavailable`.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &str, op: F) -> DbResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, ?limit, "Storage operation timed out");
            Err(DbError::timed_out(operation, limit))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::TableAccessor;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.count(Table::Reviews).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .operation_timeout(Duration::from_millis(500));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.operation_timeout, Duration::from_millis(500));
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_file_database_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mediroom.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.reviews()
            .insert(&mediroom_core::Review::new("Quick check-in"))
            .await
            .unwrap();
        assert_eq!(db.database_path().as_deref(), Some(path.as_path()));
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.count(Table::Reviews).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unopenable_path_is_storage_unavailable() {
        // A regular file can't be a parent directory, even for root
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("mediroom.db");

        let err = Database::new(DbConfig::new(path)).await.unwrap_err();
        assert!(err.is_storage_unavailable(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_closed_pool_is_storage_unavailable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(db.is_closed());
        assert!(!db.health_check().await);
        let err = db.count(Table::Appointment).await.unwrap_err();
        assert!(err.is_storage_unavailable());
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: DbResult<()> = bounded(Duration::from_millis(10), "sleep", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(result.unwrap_err().is_storage_unavailable());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_handle_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let config = DbConfig::new(&path);
            tasks.push(tokio::spawn(async move {
                Database::shared(config).await.map(|db| db as *const Database as usize)
            }));
        }

        let mut addresses = Vec::new();
        for task in tasks {
            addresses.push(task.await.unwrap().unwrap());
        }

        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert!(Database::try_shared().is_some());
    }
}
