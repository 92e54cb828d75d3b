//! # Live Queries
//!
//! Push-updated query streams.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Live Query Timeline                                │
//! │                                                                         │
//! │  watch() ── mark counter seen ──► fetch ──► yield snapshot #0          │
//! │                                     │                                   │
//! │                       counter moved? (changed().await)                  │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                                   fetch ──► yield snapshot #1           │
//! │                                     │                                   │
//! │                                    ...                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter is marked seen when the stream is created, before the first
//! fetch. An insert that commits after `watch()` returns is therefore always
//! followed by a snapshot that contains it, even if the first fetch already
//! saw it. Several inserts landing between two fetches are folded into one
//! snapshot; every snapshot reads committed state, so none is older than the
//! one before it.
//!
//! The stream runs until the consumer drops it or the change feed goes away.

use std::future::Future;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tracing::trace;

use crate::changes::Table;
use crate::error::DbResult;

/// A live query: an endless stream of full snapshots.
///
/// A failed fetch is yielded as an `Err` item and the stream keeps going;
/// the next change triggers another attempt.
pub type LiveQuery<T> = BoxStream<'static, DbResult<T>>;

/// Builds a live query over `table` that runs `fetch` on every change.
///
/// ## Arguments
/// * `table` - Table being watched (for logging)
/// * `changes` - Receiver from [`crate::ChangeFeed::subscribe`]
/// * `fetch` - Produces one snapshot; called once up front and once per change
pub fn live_query<T, F, Fut>(
    table: Table,
    mut changes: watch::Receiver<u64>,
    fetch: F,
) -> LiveQuery<T>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DbResult<T>> + Send + 'static,
{
    changes.borrow_and_update();

    stream::unfold(
        (changes, fetch, true),
        move |(mut changes, fetch, first)| async move {
            if !first {
                // Err means the feed was dropped along with the database handle
                changes.changed().await.ok()?;
                trace!(table = %table, version = *changes.borrow_and_update(), "Re-running live query");
            }

            let snapshot = fetch().await;
            Some((snapshot, (changes, fetch, false)))
        },
    )
    .boxed()
}
