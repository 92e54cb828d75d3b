//! # Profile Repository
//!
//! The device owner's profile: a single row at [`PROFILE_ID`]. Every save
//! replaces the whole row, so there is never more than one.
//!
//! ## Image Decoding
//! `profileImage` is an opaque BLOB. If a stored value can't be read as bytes
//! the failure is logged and the profile comes back with no image; the rest
//! of the profile is still delivered.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, warn};

use super::live::{live_query, LiveQuery};
use super::{execute_insert, insert_sql, ConflictPolicy, InsertOutcome, TableAccessor};
use crate::changes::Table;
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use mediroom_core::{UserProfile, PROFILE_ID};

const COLUMNS: &[&str] = &[
    "id",
    "name",
    "username",
    "email",
    "gender",
    "bio",
    "profileImage",
];

/// Repository for the user profile.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: Database,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository.
    pub fn new(db: Database) -> Self {
        ProfileRepository { db }
    }

    /// Live view of the profile: `None` until one has been saved.
    pub fn query_one(&self) -> LiveQuery<Option<UserProfile>> {
        self.watch()
    }
}

/// Decodes a `user_profile` row.
///
/// A bad image column degrades to `None`; any other bad column is an error.
fn decode_profile(row: &SqliteRow) -> DbResult<UserProfile> {
    let profile_image = match row.try_get::<Option<Vec<u8>>, _>("profileImage") {
        Ok(image) => image,
        Err(e) => {
            let err = DbError::from(e);
            warn!(error = %err, "Stored profile image is unreadable, showing none");
            None
        }
    };

    Ok(UserProfile {
        name: row.try_get("name")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        gender: row.try_get("gender")?,
        bio: row.try_get("bio")?,
        profile_image,
    })
}

#[async_trait]
impl TableAccessor for ProfileRepository {
    type Entity = UserProfile;
    type Snapshot = Option<UserProfile>;

    const TABLE: Table = Table::UserProfile;
    const POLICY: ConflictPolicy = ConflictPolicy::Replace;

    async fn insert(&self, profile: &UserProfile) -> DbResult<InsertOutcome> {
        debug!(
            name = %profile.name,
            image_bytes = profile.profile_image.as_ref().map(Vec::len),
            "Saving profile"
        );

        let sql = insert_sql(Self::TABLE, Self::POLICY, COLUMNS);
        let profile = profile.clone();

        execute_insert(&self.db, Self::TABLE, sql, move |query| {
            query
                .bind(PROFILE_ID)
                .bind(profile.name)
                .bind(profile.username)
                .bind(profile.email)
                .bind(profile.gender)
                .bind(profile.bio)
                .bind(profile.profile_image)
        })
        .await
    }

    async fn fetch(&self) -> DbResult<Option<UserProfile>> {
        self.db
            .bounded("query profile", async {
                let row = sqlx::query(
                    r#"
                    SELECT name, username, email, gender, bio, profileImage
                    FROM user_profile
                    WHERE id = ?1
                    "#,
                )
                .bind(PROFILE_ID)
                .fetch_optional(self.db.pool())
                .await?;

                row.as_ref().map(decode_profile).transpose()
            })
            .await
    }

    fn watch(&self) -> LiveQuery<Option<UserProfile>> {
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

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            username: "pat".to_string(),
            email: "pat@example.com".to_string(),
            gender: "Female".to_string(),
            bio: "Night shift".to_string(),
            profile_image: Some(vec![0x89, 0x50, 0x4E, 0x47]),
        }
    }

    #[tokio::test]
    async fn test_absent_until_saved() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.profile().fetch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_save_replaces_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.profile();

        let first = repo.insert(&profile("A")).await.unwrap();
        let mut second_profile = profile("B");
        second_profile.profile_image = None;
        let second = repo.insert(&second_profile).await.unwrap();

        assert_eq!(first, InsertOutcome::Written(PROFILE_ID));
        assert_eq!(second, InsertOutcome::Written(PROFILE_ID));
        assert_eq!(db.count(Table::UserProfile).await.unwrap(), 1);
        assert_eq!(repo.fetch().await.unwrap(), Some(second_profile));
    }

    #[tokio::test]
    async fn test_image_bytes_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.profile();
        repo.insert(&profile("A")).await.unwrap();

        let stored = repo.fetch().await.unwrap().unwrap();
        assert_eq!(stored.profile_image, Some(vec![0x89, 0x50, 0x4E, 0x47]));
    }

    #[tokio::test]
    async fn test_malformed_image_is_absent_not_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.profile();
        repo.insert(&profile("A")).await.unwrap();

        // An INTEGER where a BLOB belongs
        sqlx::query("UPDATE user_profile SET profileImage = 42 WHERE id = 1")
            .execute(db.pool())
            .await
            .unwrap();

        let stored = repo.fetch().await.unwrap().unwrap();
        assert_eq!(stored.name, "A");
        assert_eq!(stored.profile_image, None);
    }

    #[tokio::test]
    async fn test_query_one_follows_saves() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.profile();
        let mut live = repo.query_one();

        assert_eq!(live.next().await.unwrap().unwrap(), None);
        repo.insert(&profile("A")).await.unwrap();
        let snapshot = live.next().await.unwrap().unwrap();
        assert_eq!(snapshot.map(|p| p.name), Some("A".to_string()));
    }
}
