//! # Gallery Repository
//!
//! Uploaded gallery pictures, newest first. Conflict policy: REPLACE.
//!
//! Only the image reference is stored. Rows written before migration 0002
//! come back with an empty title.

use async_trait::async_trait;
use tracing::debug;

use super::live::{live_query, LiveQuery};
use super::{execute_insert, insert_sql, ConflictPolicy, InsertOutcome, TableAccessor};
use crate::changes::Table;
use crate::error::DbResult;
use crate::pool::Database;
use mediroom_core::GalleryItem;

const COLUMNS: &[&str] = &["id", "imageUri", "title", "description"];

/// Repository for gallery item database operations.
#[derive(Debug, Clone)]
pub struct GalleryRepository {
    db: Database,
}

impl GalleryRepository {
    /// Creates a new GalleryRepository.
    pub fn new(db: Database) -> Self {
        GalleryRepository { db }
    }

    /// Live list of every gallery item, newest first.
    pub fn query_all(&self) -> LiveQuery<Vec<GalleryItem>> {
        self.watch()
    }
}

#[async_trait]
impl TableAccessor for GalleryRepository {
    type Entity = GalleryItem;
    type Snapshot = Vec<GalleryItem>;

    const TABLE: Table = Table::GalleryItems;
    const POLICY: ConflictPolicy = ConflictPolicy::Replace;

    async fn insert(&self, item: &GalleryItem) -> DbResult<InsertOutcome> {
        debug!(id = ?item.id, uri = %item.image_uri, "Inserting gallery item");

        let sql = insert_sql(Self::TABLE, Self::POLICY, COLUMNS);
        let GalleryItem {
            id,
            image_uri,
            title,
            description,
        } = item.clone();

        execute_insert(&self.db, Self::TABLE, sql, move |query| {
            query.bind(id).bind(image_uri).bind(title).bind(description)
        })
        .await
    }

    async fn fetch(&self) -> DbResult<Vec<GalleryItem>> {
        self.db
            .bounded("query gallery", async {
                let rows = sqlx::query_as::<_, GalleryItem>(
                    r#"
                    SELECT id, imageUri, title, description
                    FROM gallery_items
                    ORDER BY id DESC
                    "#,
                )
                .fetch_all(self.db.pool())
                .await?;
                Ok(rows)
            })
            .await
    }

    fn watch(&self) -> LiveQuery<Vec<GalleryItem>> {
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
