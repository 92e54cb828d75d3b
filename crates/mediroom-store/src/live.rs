//! # Live Store
//!
//! The observable snapshot wrapper: one per entity type, holding the latest
//! snapshot of its table and serialising saves through a FIFO queue.
//!
//! ## Task Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         LiveStore<A>                                    │
//! │                                                                         │
//! │  save(entity) ──► mpsc queue ──► writer task ──► A::insert ──► ticket   │
//! │                   (bounded,      (one at a time,                        │
//! │                    FIFO)          submission order)                     │
//! │                                        │                                │
//! │                                   COMMIT + notify                       │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  current_value() ◄── watch cell ◄── reader task ◄── A::watch()          │
//! │  (never blocks)      (starts at     (mirrors each                       │
//! │                       Default)       snapshot)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Handling
//! - A failed read is logged and the previous snapshot stays in the cell.
//!   [`LiveStore::loaded`] reports it instead of waiting for a good read.
//! - A failed write resolves its [`SaveTicket`] with the error. Nothing is
//!   retried.
//!
//! ## Shutdown
//! [`LiveStore::shutdown`] stops accepting saves, finishes every save already
//! queued, then stops the reader. Dropping the store without a shutdown has
//! the same effect, minus the wait.

use std::fmt;

use futures::StreamExt;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use mediroom_db::{DbError, InsertOutcome, LiveQuery, TableAccessor};

use crate::error::{StoreError, StoreResult};

/// Default capacity of the save queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

// =============================================================================
// Save Ticket
// =============================================================================

/// Completion notice for a queued save.
///
/// Dropping the ticket does not cancel the save.
#[derive(Debug)]
pub struct SaveTicket {
    rx: oneshot::Receiver<StoreResult<InsertOutcome>>,
}

impl SaveTicket {
    /// Waits until the save has been committed (or has failed).
    pub async fn wait(self) -> StoreResult<InsertOutcome> {
        self.rx.await.map_err(|_| StoreError::Closed)?
    }
}

/// Outcome of the reader's most recent read.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReadStatus {
    /// Nothing read yet.
    Pending,
    Loaded,
    Failed { unavailable: bool, reason: String },
}

impl ReadStatus {
    fn failed(e: &DbError) -> Self {
        match e {
            DbError::StorageUnavailable(reason) => ReadStatus::Failed {
                unavailable: true,
                reason: reason.clone(),
            },
            other => ReadStatus::Failed {
                unavailable: false,
                reason: other.to_string(),
            },
        }
    }
}

struct WriteRequest<E> {
    entity: E,
    reply: oneshot::Sender<StoreResult<InsertOutcome>>,
}

// =============================================================================
// Live Store
// =============================================================================

/// Observable snapshot wrapper over one table accessor.
pub struct LiveStore<A: TableAccessor> {
    /// Latest snapshot mirrored by the reader task.
    snapshot: watch::Receiver<A::Snapshot>,

    /// Whether the latest read succeeded.
    status: watch::Receiver<ReadStatus>,

    /// Save queue feeding the writer task.
    write_tx: mpsc::Sender<WriteRequest<A::Entity>>,

    /// Flipped to true on shutdown.
    shutdown_tx: watch::Sender<bool>,

    /// Writer and reader tasks, joined on shutdown.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<A: TableAccessor> fmt::Debug for LiveStore<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveStore")
            .field("table", &A::TABLE)
            .field("closed", &self.write_tx.is_closed())
            .finish()
    }
}

impl<A: TableAccessor> LiveStore<A> {
    /// Creates the store and starts its reader and writer tasks.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// ## Arguments
    /// * `accessor` - Table accessor to read from and write through
    /// * `queue_capacity` - Saves that may wait in the queue before `save` waits
    pub fn new(accessor: A, queue_capacity: usize) -> Self {
        let (snapshot_tx, snapshot) = watch::channel(A::Snapshot::default());
        let (write_tx, write_rx) = mpsc::channel(queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (status_tx, status) = watch::channel(ReadStatus::Pending);

        let reader = tokio::spawn(run_reader::<A>(
            accessor.watch(),
            snapshot_tx,
            status_tx,
            shutdown_rx.clone(),
        ));
        let writer = tokio::spawn(run_writer(accessor, write_rx, shutdown_rx));

        debug!(table = %A::TABLE, queue_capacity, "Live store started");

        LiveStore {
            snapshot,
            status,
            write_tx,
            shutdown_tx,
            tasks: Mutex::new(vec![writer, reader]),
        }
    }

    /// Returns the latest snapshot without waiting.
    ///
    /// Before the first read completes this is `A::Snapshot::default()`.
    pub fn current_value(&self) -> A::Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Waits for the first read from storage, then returns the latest
    /// snapshot.
    ///
    /// Returns immediately once any read has finished. Useful for one-shot
    /// callers that can't tell "empty table" from "not loaded yet".
    ///
    /// ## Errors
    /// * `StoreError::Db` - the most recent read failed; the error kind is
    ///   kept (`StorageUnavailable` for an unreachable medium)
    /// * `StoreError::Closed` - the store stopped before anything was read
    pub async fn loaded(&self) -> StoreResult<A::Snapshot> {
        let mut status = self.status.clone();
        let outcome = status
            .wait_for(|s| *s != ReadStatus::Pending)
            .await
            .map_err(|_| StoreError::Closed)?
            .clone();

        match outcome {
            ReadStatus::Failed {
                unavailable: true,
                reason,
            } => Err(DbError::StorageUnavailable(reason).into()),
            ReadStatus::Failed { reason, .. } => Err(DbError::QueryFailed(reason).into()),
            ReadStatus::Pending | ReadStatus::Loaded => Ok(self.current_value()),
        }
    }

    /// Returns a receiver that is notified whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<A::Snapshot> {
        self.snapshot.clone()
    }

    /// Stream of snapshots: the current one, then every later one.
    pub fn updates(&self) -> WatchStream<A::Snapshot> {
        WatchStream::new(self.snapshot.clone())
    }

    /// Queues `entity` for insertion.
    ///
    /// The save is in the queue when this returns, so saves from one task
    /// are committed in call order. Waits only if the queue is full.
    ///
    /// ## Errors
    /// * `StoreError::Closed` - the store has been shut down
    pub async fn save(&self, entity: A::Entity) -> StoreResult<SaveTicket> {
        let (reply, rx) = oneshot::channel();
        self.write_tx
            .send(WriteRequest { entity, reply })
            .await
            .map_err(|_| StoreError::Closed)?;
        Ok(SaveTicket { rx })
    }

    /// Queues `entity` and waits for the commit.
    pub async fn save_and_wait(&self, entity: A::Entity) -> StoreResult<InsertOutcome> {
        self.save(entity).await?.wait().await
    }

    /// Returns true once shutdown has begun.
    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Stops accepting saves, drains the queue, and stops the reader.
    ///
    /// Idempotent.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);

        let tasks: Vec<_> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(table = %A::TABLE, error = %e, "Live store task ended abnormally");
            }
        }

        info!(table = %A::TABLE, "Live store stopped");
    }
}

// =============================================================================
// Background Tasks
// =============================================================================

async fn run_reader<A: TableAccessor>(
    mut live: LiveQuery<A::Snapshot>,
    cell: watch::Sender<A::Snapshot>,
    status: watch::Sender<ReadStatus>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => break,

            item = live.next() => match item {
                Some(Ok(snapshot)) => {
                    // Snapshot first, so `loaded` never sees Loaded with a stale cell
                    cell.send_replace(snapshot);
                    status.send_replace(ReadStatus::Loaded);
                }
                Some(Err(e)) => {
                    // Keep showing the last good snapshot
                    warn!(table = %A::TABLE, error = %e, "Live query read failed");
                    status.send_replace(ReadStatus::failed(&e));
                }
                None => break,
            },
        }
    }

    debug!(table = %A::TABLE, "Reader stopped");
}

async fn run_writer<A: TableAccessor>(
    accessor: A,
    mut queue: mpsc::Receiver<WriteRequest<A::Entity>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;

            request = queue.recv() => match request {
                Some(request) => apply(&accessor, request).await,
                None => break,
            },

            _ = shutdown.changed() => {
                // Refuse new saves, then finish the ones already queued
                queue.close();
                while let Some(request) = queue.recv().await {
                    apply(&accessor, request).await;
                }
                break;
            }
        }
    }

    debug!(table = %A::TABLE, "Writer stopped");
}

async fn apply<A: TableAccessor>(accessor: &A, request: WriteRequest<A::Entity>) {
    let result = accessor.insert(&request.entity).await.map_err(StoreError::from);

    if let Err(e) = &result {
        warn!(table = %A::TABLE, error = %e, "Save failed");
    }

    // The caller may have dropped its ticket
    let _ = request.reply.send(result);
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mediroom_core::{Appointment, Review, UserProfile};
    use mediroom_db::{
        AppointmentRepository, Database, DbConfig, ProfileRepository, ReviewRepository,
    };
    use std::time::Duration;

    async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn settled<T: Clone>(
        rx: &mut watch::Receiver<T>,
        done: impl FnMut(&T) -> bool,
    ) -> T {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(done))
            .await
            .expect("snapshot did not settle")
            .expect("store dropped")
            .clone()
    }

    #[tokio::test]
    async fn test_current_value_starts_at_default() {
        let db = database().await;

        let reviews: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 8);
        let profile: LiveStore<ProfileRepository> = LiveStore::new(db.profile(), 8);

        assert!(reviews.current_value().is_empty());
        assert_eq!(profile.current_value(), None);
    }

    #[tokio::test]
    async fn test_loaded_waits_for_first_read() {
        let db = database().await;
        db.reviews()
            .insert(&Review::new("Already stored"))
            .await
            .unwrap();

        let store: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 8);
        assert!(store.current_value().is_empty());

        let loaded = tokio::time::timeout(Duration::from_secs(2), store.loaded())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(store.current_value(), loaded);

        // Later calls return straight away
        let again = tokio::time::timeout(Duration::from_millis(100), store.loaded())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again, loaded);
    }

    #[tokio::test]
    async fn test_loaded_reports_failed_first_read() {
        let db = database().await;
        db.close().await;

        let store: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 4);
        let err = tokio::time::timeout(Duration::from_secs(2), store.loaded())
            .await
            .expect("loaded() hung on a failed read")
            .unwrap_err();

        assert!(err.is_storage_unavailable(), "unexpected error: {err:?}");
        assert!(store.current_value().is_empty());
    }

    #[tokio::test]
    async fn test_appointment_scenario() {
        let db = database().await;
        let store: LiveStore<AppointmentRepository> = LiveStore::new(db.appointments(), 8);
        let mut rx = store.subscribe();

        store
            .save(Appointment::new("Dr. Jane Smith", "09:00 AM", ""))
            .await
            .unwrap();
        store
            .save_and_wait(Appointment::new("Dr. Michael Lee", "10:30 AM", "follow-up"))
            .await
            .unwrap();

        let snapshot = settled(&mut rx, |rows| rows.len() == 2).await;
        let view: Vec<_> = snapshot
            .iter()
            .map(|a| (a.doctor_name.as_str(), a.time.as_str(), a.notes.as_str()))
            .collect();
        assert_eq!(
            view,
            [
                ("Dr. Michael Lee", "10:30 AM", "follow-up"),
                ("Dr. Jane Smith", "09:00 AM", ""),
            ]
        );
        assert_eq!(store.current_value(), snapshot);
    }

    #[tokio::test]
    async fn test_last_profile_save_wins() {
        let db = database().await;
        let store: LiveStore<ProfileRepository> = LiveStore::new(db.profile(), 8);
        let mut rx = store.subscribe();

        let a = UserProfile {
            name: "A".into(),
            ..UserProfile::default()
        };
        let b = UserProfile {
            name: "B".into(),
            bio: "Updated".into(),
            ..UserProfile::default()
        };

        let first = store.save(a).await.unwrap();
        let second = store.save(b.clone()).await.unwrap();
        first.wait().await.unwrap();
        second.wait().await.unwrap();

        let snapshot = settled(&mut rx, |p| p.as_ref().is_some_and(|p| p.name == "B")).await;
        assert_eq!(snapshot, Some(b));
        assert_eq!(db.count(mediroom_db::Table::UserProfile).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_saves_apply_in_submission_order() {
        let db = database().await;
        let store: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 4);

        let mut tickets = Vec::new();
        for n in 0..10 {
            tickets.push(store.save(Review::new(format!("review {n}"))).await.unwrap());
        }

        let mut last = 0;
        for ticket in tickets {
            let id = ticket.wait().await.unwrap().id().unwrap();
            assert!(id > last);
            last = id;
        }
    }

    #[tokio::test]
    async fn test_review_collision_is_ignored() {
        let db = database().await;
        let store: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 8);
        let mut rx = store.subscribe();

        store
            .save_and_wait(Review::new("Great nurses").with_id(5))
            .await
            .unwrap();
        let outcome = store
            .save_and_wait(Review::new("Replaced?").with_id(5))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::Ignored);
        let snapshot = settled(&mut rx, |rows| !rows.is_empty()).await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].content, "Great nurses");
    }

    #[tokio::test]
    async fn test_appointment_collision_is_replaced() {
        let db = database().await;
        let store: LiveStore<AppointmentRepository> = LiveStore::new(db.appointments(), 8);
        let mut rx = store.subscribe();

        store
            .save_and_wait(Appointment::new("Dr. Jane Smith", "09:00 AM", "").with_id(3))
            .await
            .unwrap();
        store
            .save_and_wait(Appointment::new("Dr. Jane Smith", "11:00 AM", "moved").with_id(3))
            .await
            .unwrap();

        let snapshot = settled(&mut rx, |rows| {
            rows.len() == 1 && rows[0].time == "11:00 AM"
        })
        .await;
        assert_eq!(snapshot[0].notes, "moved");
    }

    #[tokio::test]
    async fn test_two_stores_on_one_table_see_each_other() {
        let db = database().await;
        let writer: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 8);
        let observer: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 8);
        let mut rx = observer.subscribe();

        writer.save_and_wait(Review::new("Seen elsewhere")).await.unwrap();

        let snapshot = settled(&mut rx, |rows| rows.len() == 1).await;
        assert_eq!(snapshot[0].content, "Seen elsewhere");
    }

    #[tokio::test]
    async fn test_write_failure_resolves_ticket_and_keeps_snapshot() {
        let db = database().await;
        let store: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 8);
        let mut rx = store.subscribe();

        store.save_and_wait(Review::new("Before")).await.unwrap();
        settled(&mut rx, |rows| rows.len() == 1).await;

        db.close().await;
        let err = store.save_and_wait(Review::new("After")).await.unwrap_err();
        assert!(err.is_storage_unavailable(), "unexpected error: {err:?}");
        assert_eq!(store.current_value().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue_then_refuses() {
        let db = database().await;
        let store: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 16);

        let tickets: Vec<_> = futures::future::join_all(
            (0..5).map(|n| store.save(Review::new(format!("queued {n}")))),
        )
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

        store.shutdown().await;
        assert!(store.is_closed());

        for ticket in tickets {
            assert!(matches!(ticket.wait().await, Ok(InsertOutcome::Written(_))));
        }
        assert_eq!(db.count(mediroom_db::Table::Reviews).await.unwrap(), 5);

        let err = store.save(Review::new("too late")).await.unwrap_err();
        assert!(matches!(err, StoreError::Closed));

        // Second shutdown is a no-op
        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_updates_stream_starts_with_current() {
        let db = database().await;
        let store: LiveStore<ReviewRepository> = LiveStore::new(db.reviews(), 8);
        let mut updates = store.updates();

        assert!(updates.next().await.unwrap().is_empty());

        store.save_and_wait(Review::new("Streamed")).await.unwrap();
        loop {
            let snapshot = tokio::time::timeout(Duration::from_secs(2), updates.next())
                .await
                .unwrap()
                .unwrap();
            if !snapshot.is_empty() {
                assert_eq!(snapshot[0].content, "Streamed");
                break;
            }
        }
    }
}
