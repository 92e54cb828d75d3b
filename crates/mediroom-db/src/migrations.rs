//! # Database Migrations
//!
//! Embedded, versioned SQL migrations.
//!
//! ## Upgrade Ladder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Opening a Database File                            │
//! │                                                                         │
//! │  Read _sqlx_migrations                                                 │
//! │       │                                                                 │
//! │       ├── Empty file?        → apply 0001, 0002 in order               │
//! │       ├── Version 1 file?    → apply 0002 only (rows preserved)        │
//! │       ├── Version 2 file?    → nothing to do                           │
//! │       └── Version 3+ file?   → NoMigrationPath (written by newer build)│
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create `migrations/sqlite/NNNN_description.sql` with the next number
//! 2. Never modify an applied migration; the checksum is verified on open
//! 3. Migrations must preserve existing rows. There is no destructive fallback.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// ## Errors
/// - [`crate::DbError::NoMigrationPath`] if the file has a version this build
///   doesn't know
/// - [`crate::DbError::MigrationFailed`] if a migration script fails
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(latest = latest_version(), "Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Highest schema version embedded in this build.
pub fn latest_version() -> i64 {
    MIGRATOR
        .iter()
        .map(|migration| migration.version)
        .max()
        .unwrap_or(0)
}

/// Highest applied schema version, or `None` for a fresh file.
pub async fn schema_version(pool: &SqlitePool) -> DbResult<Option<i64>> {
    let exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    if exists == 0 {
        return Ok(None);
    }

    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(version)
}

/// Returns information about migrations.
///
/// ## Returns
/// Tuple of (embedded_migrations, applied_migrations)
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.iter().count();

    let applied = match schema_version(pool).await? {
        None => 0,
        Some(_) => {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                    .fetch_one(pool)
                    .await?;
            count as usize
        }
    };

    Ok((total, applied))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_fresh_database_reaches_latest() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(schema_version(db.pool()).await.unwrap(), Some(latest_version()));
        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert_eq!(latest_version(), 2);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.run_migrations().await.unwrap();
        db.run_migrations().await.unwrap();

        assert_eq!(schema_version(db.pool()).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_version_one_file_is_upgraded_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v1.db");

        // A migrator that only knows version 1 produces a version-1 file
        let first = MIGRATOR.iter().next().unwrap();
        let v1_dir = dir.path().join("v1");
        std::fs::create_dir(&v1_dir).unwrap();
        std::fs::write(v1_dir.join("0001_initial_schema.sql"), first.sql.as_bytes()).unwrap();
        let v1 = sqlx::migrate::Migrator::new(v1_dir.as_path()).await.unwrap();

        let db = Database::new(DbConfig::new(&path).run_migrations(false))
            .await
            .unwrap();
        v1.run(db.pool()).await.unwrap();
        assert_eq!(schema_version(db.pool()).await.unwrap(), Some(1));
        sqlx::query(
            "INSERT INTO gallery_items (imageUri, description) VALUES ('file:///ward.jpg', 'Ward')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(schema_version(db.pool()).await.unwrap(), Some(2));

        let (uri, title): (String, String) =
            sqlx::query_as("SELECT imageUri, title FROM gallery_items")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(uri, "file:///ward.jpg");
        assert_eq!(title, "");
    }

    #[tokio::test]
    async fn test_newer_file_has_no_migration_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        sqlx::query(
            "INSERT INTO _sqlx_migrations (version, description, success, checksum, execution_time)
             VALUES (99, 'from the future', 1, x'00', 0)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        db.close().await;

        let err = Database::new(DbConfig::new(&path)).await.unwrap_err();
        assert!(
            matches!(err, DbError::NoMigrationPath { found: 99, latest: 2 }),
            "unexpected error: {err:?}"
        );
    }
}
