//! # Repository Module
//!
//! Typed table accessors for MediRoom.
//!
//! ## Accessor Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Accessor per Table                               │
//! │                                                                         │
//! │  LiveStore / CLI command                                               │
//! │       │                                                                 │
//! │       │  db.reviews().insert(&review)                                  │
//! │       │  db.reviews().query_all()                                      │
//! │       ▼                                                                 │
//! │  ReviewRepository (impl TableAccessor)                                 │
//! │  ├── insert(&self, entity)  → INSERT OR IGNORE ... → notify(reviews)   │
//! │  ├── fetch(&self)           → SELECT ... ORDER BY id DESC              │
//! │  └── watch(&self)           → LiveQuery (fetch on every change)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`AppointmentRepository`](appointment::AppointmentRepository) - REPLACE, newest first
//! - [`GalleryRepository`](gallery::GalleryRepository) - REPLACE, newest first
//! - [`ProfileRepository`](profile::ProfileRepository) - REPLACE, single row
//! - [`ReviewRepository`](review::ReviewRepository) - IGNORE, newest first

pub mod appointment;
pub mod gallery;
pub mod live;
pub mod profile;
pub mod review;

use async_trait::async_trait;
use mediroom_core::RowId;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;
use std::sync::Arc;
use tracing::debug;

use crate::changes::Table;
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use live::LiveQuery;

// =============================================================================
// Conflict Policy
// =============================================================================

/// What an insert does when the target identity already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Overwrite the existing row with the new values.
    Replace,
    /// Keep the existing row and drop the new one.
    Ignore,
}

impl ConflictPolicy {
    /// SQLite conflict clause for `INSERT OR <verb>`.
    pub const fn verb(&self) -> &'static str {
        match self {
            ConflictPolicy::Replace => "REPLACE",
            ConflictPolicy::Ignore => "IGNORE",
        }
    }
}

/// Result of a committed insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written (new or replaced) under this identity.
    Written(RowId),
    /// An IGNORE table already had the identity; nothing changed.
    Ignored,
}

impl InsertOutcome {
    /// Identity of the written row, if any.
    pub fn id(&self) -> Option<RowId> {
        match self {
            InsertOutcome::Written(id) => Some(*id),
            InsertOutcome::Ignored => None,
        }
    }
}

// =============================================================================
// Table Accessor
// =============================================================================

/// Typed access to one physical table.
///
/// The accessor owns every SQL statement for its table. Callers see only
/// entities and snapshots.
#[async_trait]
pub trait TableAccessor: Clone + Send + Sync + 'static {
    /// The row type written by [`TableAccessor::insert`].
    type Entity: Send + Sync + 'static;

    /// What a query observes: `Vec<Entity>` for list tables, `Option<Entity>`
    /// for the single-row profile. `Default` is the "nothing loaded yet" value.
    type Snapshot: Clone + Default + Send + Sync + 'static;

    /// Physical table.
    const TABLE: Table;

    /// Conflict policy applied on identity collision.
    const POLICY: ConflictPolicy;

    /// Durably writes `entity`, then wakes every live query on the table.
    ///
    /// The write is a single statement in its own transaction, so a crash
    /// never leaves a partial row.
    async fn insert(&self, entity: &Self::Entity) -> DbResult<InsertOutcome>;

    /// Reads the current snapshot once.
    async fn fetch(&self) -> DbResult<Self::Snapshot>;

    /// Opens a live query: the current snapshot first, then a fresh one
    /// after every committed change. Returns immediately.
    fn watch(&self) -> LiveQuery<Self::Snapshot>;
}

// =============================================================================
// Shared Insert Path
// =============================================================================

/// Builds `INSERT OR <policy> INTO <table> (cols) VALUES (?1, ?2, ...)`.
pub(crate) fn insert_sql(table: Table, policy: ConflictPolicy, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("?{}", n)).collect();
    format!(
        "INSERT OR {} INTO {} ({}) VALUES ({})",
        policy.verb(),
        table.name(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// A statement as built by an accessor: `sqlx::query(sql)` plus its binds.
pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Executes an insert under the operation timeout and notifies the table's
/// live queries once it has committed.
///
/// `bind` attaches the row's values to the statement and must own them: the
/// statement runs on its own task so that a timeout can't cancel it halfway.
/// A timeout therefore means the outcome is unknown, not that nothing was
/// written. If the row does commit later, the task still notifies, so live
/// queries pick it up.
pub(crate) async fn execute_insert<B>(
    db: &Database,
    table: Table,
    sql: String,
    bind: B,
) -> DbResult<InsertOutcome>
where
    B: for<'q> FnOnce(SqliteQuery<'q>) -> SqliteQuery<'q> + Send + 'static,
{
    let pool = db.pool().clone();
    let changes = Arc::clone(db.changes());

    let write = tokio::spawn(async move {
        let done = match bind(sqlx::query(&sql)).execute(&pool).await {
            Ok(done) => done,
            Err(e) => return Err(DbError::from(e)),
        };

        if done.rows_affected() == 0 {
            debug!(table = %table, "Insert ignored: identity already present");
            return Ok(InsertOutcome::Ignored);
        }

        let id = done.last_insert_rowid();
        debug!(table = %table, id, "Row written");
        changes.notify(table);
        Ok(InsertOutcome::Written(id))
    });

    db.bounded("insert", async {
        match write.await {
            Ok(outcome) => outcome,
            Err(e) => Err(DbError::Internal(format!("insert task failed: {}", e))),
        }
    })
    .await
}
