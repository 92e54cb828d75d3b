//! # Change Feed
//!
//! Per-table change counters. Every committed insert bumps its table's
//! counter; every live query over that table waits on the counter and re-runs
//! its SELECT when it moves.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Change Propagation                              │
//! │                                                                         │
//! │  ReviewRepository::insert ──► COMMIT ──► feed.notify(Table::Reviews)    │
//! │                                              │                          │
//! │                              watch::Sender<u64> (reviews) += 1          │
//! │                                              │                          │
//! │                   ┌──────────────────────────┼─────────────────┐        │
//! │                   ▼                          ▼                 ▼        │
//! │            live query #1              live query #2     live query #3   │
//! │            (LiveStore)                (CLI watch)       (test)          │
//! │                   │                          │                 │        │
//! │                   ▼                          ▼                 ▼        │
//! │            SELECT ... ORDER BY id DESC → new full snapshot              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A watch channel only keeps the latest value, so bursts of inserts may be
//! folded into one re-query. The re-query always reads committed state, so a
//! subscriber never sees an older snapshot after a newer one.

use tokio::sync::watch;
use tracing::trace;

/// The physical tables managed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Appointment,
    GalleryItems,
    UserProfile,
    Reviews,
}

impl Table {
    /// All tables, in migration order.
    pub const ALL: [Table; 4] = [
        Table::Appointment,
        Table::GalleryItems,
        Table::UserProfile,
        Table::Reviews,
    ];

    /// Physical table name.
    pub const fn name(&self) -> &'static str {
        match self {
            Table::Appointment => "appointment",
            Table::GalleryItems => "gallery_items",
            Table::UserProfile => "user_profile",
            Table::Reviews => "reviews",
        }
    }

    const fn index(&self) -> usize {
        match self {
            Table::Appointment => 0,
            Table::GalleryItems => 1,
            Table::UserProfile => 2,
            Table::Reviews => 3,
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Change counters for every table, owned by the [`crate::Database`] handle.
#[derive(Debug)]
pub struct ChangeFeed {
    senders: [watch::Sender<u64>; 4],
}

impl ChangeFeed {
    /// Creates a feed with every counter at zero.
    pub fn new() -> Self {
        ChangeFeed {
            senders: std::array::from_fn(|_| watch::channel(0).0),
        }
    }

    /// Records a committed change to `table` and wakes its live queries.
    pub fn notify(&self, table: Table) {
        let sender = &self.senders[table.index()];
        sender.send_modify(|version| *version += 1);
        trace!(
            table = %table,
            version = *sender.borrow(),
            subscribers = sender.receiver_count(),
            "Table changed"
        );
    }

    /// Subscribes to changes of `table`.
    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.senders[table.index()].subscribe()
    }

    /// Current change counter of `table`.
    pub fn version(&self, table: Table) -> u64 {
        *self.senders[table.index()].borrow()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        ChangeFeed::new()
    }
}
