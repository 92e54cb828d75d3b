//! # mediroom-db: Database Layer for MediRoom
//!
//! This crate provides the local entity store's persistence: one SQLite
//! database per process, a typed accessor per table, and live queries that
//! push a fresh snapshot whenever a table changes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MediRoom Data Flow                               │
//! │                                                                         │
//! │  LiveStore::save(review)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  mediroom-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (review.rs..) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ insert()      │    │ 0001_init    │  │   │
//! │  │   │ ChangeFeed    │◄───│ watch()       │    │ 0002_title   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/mediroom/mediroom.db                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Storage handle creation, configuration, process-wide singleton
//! - [`migrations`] - Embedded, versioned database migrations
//! - [`changes`] - Per-table change counters that drive live queries
//! - [`error`] - Database error types
//! - [`repository`] - Table accessors (appointment, gallery, profile, review)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mediroom_db::{Database, DbConfig, TableAccessor};
//! use futures::StreamExt;
//!
//! let db = Database::new(DbConfig::new("path/to/mediroom.db")).await?;
//!
//! let mut reviews = db.reviews().query_all();
//! db.reviews().insert(&Review::new("Friendly staff")).await?;
//!
//! // First item is the snapshot at subscription time, later items follow inserts
//! while let Some(snapshot) = reviews.next().await { /* render */ }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod changes;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use changes::{ChangeFeed, Table};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::appointment::AppointmentRepository;
pub use repository::gallery::GalleryRepository;
pub use repository::live::LiveQuery;
pub use repository::profile::ProfileRepository;
pub use repository::review::ReviewRepository;
pub use repository::{ConflictPolicy, InsertOutcome, TableAccessor};
