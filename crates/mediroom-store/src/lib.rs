//! # mediroom-store: Observable Entity Stores
//!
//! Presentation code never talks to the database directly. It holds a
//! [`Stores`] and, per entity type, reads the latest snapshot with
//! [`LiveStore::current_value`] and writes with [`LiveStore::save`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mediroom_store::{StoreConfig, Stores};
//!
//! let config = StoreConfig::load(None)?;
//! let stores = Stores::open(&config).await?;
//!
//! // Never blocks; empty until the first read lands
//! let reviews = stores.reviews().current_value();
//!
//! // Queued in order; the ticket resolves once the row is on disk
//! let ticket = stores.reviews().save(Review::new("Friendly staff")).await?;
//! ticket.wait().await?;
//!
//! stores.shutdown().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod live;
pub mod stores;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{DatabaseSettings, StoreConfig, StoreSettings};
pub use error::{StoreError, StoreResult};
pub use live::{LiveStore, SaveTicket, DEFAULT_QUEUE_CAPACITY};
pub use stores::Stores;
