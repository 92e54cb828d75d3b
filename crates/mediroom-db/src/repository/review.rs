//! # Review Repository
//!
//! Patient reviews, newest first. Conflict policy: IGNORE, so a review is
//! stored at most once per identity and a colliding insert leaves the
//! existing content untouched.

use async_trait::async_trait;
use tracing::debug;

use super::live::{live_query, LiveQuery};
use super::{execute_insert, insert_sql, ConflictPolicy, InsertOutcome, TableAccessor};
use crate::changes::Table;
use crate::error::DbResult;
use crate::pool::Database;
use mediroom_core::Review;

const COLUMNS: &[&str] = &["id", "content"];

/// Repository for review database operations.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    db: Database,
}

impl ReviewRepository {
    /// Creates a new ReviewRepository.
    pub fn new(db: Database) -> Self {
        ReviewRepository { db }
    }

    /// Live list of every review, newest first.
    pub fn query_all(&self) -> LiveQuery<Vec<Review>> {
        self.watch()
    }
}

#[async_trait]
impl TableAccessor for ReviewRepository {
    type Entity = Review;
    type Snapshot = Vec<Review>;

    const TABLE: Table = Table::Reviews;
    const POLICY: ConflictPolicy = ConflictPolicy::Ignore;

    async fn insert(&self, review: &Review) -> DbResult<InsertOutcome> {
        debug!(id = ?review.id, chars = review.content.chars().count(), "Inserting review");

        let sql = insert_sql(Self::TABLE, Self::POLICY, COLUMNS);
        let Review { id, content } = review.clone();

        execute_insert(&self.db, Self::TABLE, sql, move |query| {
            query.bind(id).bind(content)
        })
        .await
    }

    async fn fetch(&self) -> DbResult<Vec<Review>> {
        self.db
            .bounded("query reviews", async {
                let rows = sqlx::query_as::<_, Review>(
                    "SELECT id, content FROM reviews ORDER BY id DESC",
                )
                .fetch_all(self.db.pool())
                .await?;
                Ok(rows)
            })
            .await
    }

    fn watch(&self) -> LiveQuery<Vec<Review>> {
        let repo = self.clone();
        live_query(
            Self::TABLE,
            self.db.changes().subscribe(Self::TABLE),
            move || {
                let repo = repo.clone();
                async move { repo.fetch().await }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use futures::StreamExt;
    use std::time::Duration;

    #[tokio::test]
    async fn test_collision_keeps_existing_content() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reviews = db.reviews();

        let id = reviews
            .insert(&Review::new("Friendly staff"))
            .await
            .unwrap()
            .id()
            .unwrap();
        let outcome = reviews
            .insert(&Review::new("Overwritten?").with_id(id))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::Ignored);
        let rows = reviews.fetch().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "Friendly staff");
    }

    #[tokio::test]
    async fn test_ignored_insert_does_not_wake_queries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reviews = db.reviews();
        reviews.insert(&Review::new("Clean").with_id(1)).await.unwrap();

        let mut live = reviews.query_all();
        assert_eq!(live.next().await.unwrap().unwrap().len(), 1);

        reviews.insert(&Review::new("Dup").with_id(1)).await.unwrap();
        let next = tokio::time::timeout(Duration::from_millis(50), live.next()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let reviews = db.reviews();
        for content in ["one", "two", "three"] {
            reviews.insert(&Review::new(content)).await.unwrap();
        }

        let contents: Vec<_> = reviews
            .fetch()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.content)
            .collect();
        assert_eq!(contents, ["three", "two", "one"]);
    }

    #[tokio::test]
    async fn test_store_accepts_blank_content() {
        // Blank reviews are rejected by callers, not by storage
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let outcome = db.reviews().insert(&Review::new("   ")).await.unwrap();
        assert!(matches!(outcome, InsertOutcome::Written(_)));
    }
}
