//! # Watch Command
//!
//! Follows one table through its live store and prints every snapshot.
//!
//! ```text
//! watch reviews
//!   │
//!   ▼
//! stores.reviews().updates()  ──►  [] ─► [r1] ─► [r2, r1] ─► ...
//!   │                                (printed as they arrive)
//!   ▼
//! ends on Ctrl-C, after --count snapshots, or when the store closes
//! ```
//!
//! The first snapshot printed may be the empty placeholder from before the
//! initial read; snapshots that change faster than they print are
//! coalesced into the latest one.

use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::info;

use crate::commands::appointment::AppointmentDto;
use crate::commands::gallery::GalleryItemDto;
use crate::commands::profile::ProfileDto;
use crate::commands::review::ReviewDto;
use crate::output::{self, Render};
use crate::WatchTarget;
use mediroom_store::Stores;

/// Prints snapshots of `target` until interrupted.
///
/// ## Arguments
/// * `count` - Stop after this many snapshots; `None` runs until Ctrl-C
pub async fn run(
    stores: &Stores,
    target: WatchTarget,
    count: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    info!(?target, "Watching for changes (Ctrl-C to stop)");

    match target {
        WatchTarget::Appointments => {
            let snapshots = stores.appointments().updates().map(|list| {
                list.into_iter().map(AppointmentDto::from).collect::<Vec<_>>()
            });
            print_snapshots(snapshots, count, json).await
        }
        WatchTarget::Gallery => {
            let snapshots = stores.gallery().updates().map(|list| {
                list.into_iter().map(GalleryItemDto::from).collect::<Vec<_>>()
            });
            print_snapshots(snapshots, count, json).await
        }
        WatchTarget::Profile => {
            let snapshots = stores
                .profile()
                .updates()
                .map(|profile| profile.map(ProfileDto::from));
            print_snapshots(snapshots, count, json).await
        }
        WatchTarget::Reviews => {
            let snapshots = stores
                .reviews()
                .updates()
                .map(|list| list.into_iter().map(ReviewDto::from).collect::<Vec<_>>());
            print_snapshots(snapshots, count, json).await
        }
    }
}

async fn print_snapshots<S, T>(snapshots: S, count: Option<usize>, json: bool) -> anyhow::Result<()>
where
    S: Stream<Item = T>,
    T: Serialize + Render,
{
    let printed = collect_snapshots(snapshots, count, |snapshot| {
        println!("{}", output::format(snapshot, json)?);
        if !json {
            println!("---");
        }
        Ok(())
    })
    .await?;

    info!(printed, "Watch ended");
    Ok(())
}

/// Feeds snapshots to `sink` until `count` is reached, the stream ends, or
/// Ctrl-C arrives. Returns how many were handled.
pub(crate) async fn collect_snapshots<S, T, F>(
    snapshots: S,
    count: Option<usize>,
    mut sink: F,
) -> anyhow::Result<usize>
where
    S: Stream<Item = T>,
    F: FnMut(&T) -> anyhow::Result<()>,
{
    let limit = count.unwrap_or(usize::MAX);
    let mut handled = 0;

    let mut snapshots = std::pin::pin!(snapshots.take(limit));
    let mut interrupt = std::pin::pin!(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            next = snapshots.next() => match next {
                Some(snapshot) => {
                    sink(&snapshot)?;
                    handled += 1;
                }
                None => break,
            },
            _ = &mut interrupt => break,
        }
    }

    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::review::submit_review;
    use crate::commands::test_support::memory_stores;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sees_new_review() {
        let stores = memory_stores().await;
        // Wait for the first read so the placeholder isn't the only snapshot
        stores.reviews().loaded().await.unwrap();

        let snapshots = stores.reviews().updates();
        let mut seen = Vec::new();

        let watcher = collect_snapshots(snapshots, None, |list| {
            seen.push(list.len());
            if list.iter().any(|r| r.content == "Clean rooms") {
                anyhow::bail!("done");
            }
            Ok(())
        });

        let (watched, submitted) = tokio::join!(
            tokio::time::timeout(Duration::from_secs(5), watcher),
            submit_review(&stores, "Clean rooms"),
        );
        submitted.unwrap();

        // The sink stops the watch by returning an error once it sees the review
        assert!(watched.unwrap().is_err());
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&1));

        stores.shutdown().await;
    }

    #[tokio::test]
    async fn test_stops_after_count() {
        let snapshots = futures::stream::iter([1, 2, 3, 4]);
        let mut seen = Vec::new();

        let handled = collect_snapshots(snapshots, Some(2), |n| {
            seen.push(*n);
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(handled, 2);
        assert_eq!(seen, [1, 2]);
    }

    #[tokio::test]
    async fn test_ends_with_stream() {
        let handled = collect_snapshots(futures::stream::empty::<u8>(), None, |_| Ok(()))
            .await
            .unwrap();
        assert_eq!(handled, 0);
    }
}
