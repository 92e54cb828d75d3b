//! # Stores
//!
//! The four live stores, one per entity type, created once and shared.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Stores                                     │
//! │                                                                         │
//! │   Database ─┬─► LiveStore<AppointmentRepository>   Vec<Appointment>     │
//! │             ├─► LiveStore<GalleryRepository>       Vec<GalleryItem>     │
//! │             ├─► LiveStore<ProfileRepository>       Option<UserProfile>  │
//! │             └─► LiveStore<ReviewRepository>        Vec<Review>          │
//! │                                                                         │
//! │   open() ─► (use) ─► shutdown(): drain every queue, close the pool     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::OnceCell;
use tracing::info;

use mediroom_db::{
    AppointmentRepository, Database, DbError, GalleryRepository, ProfileRepository,
    ReviewRepository,
};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::live::LiveStore;

static SHARED: OnceCell<Stores> = OnceCell::const_new();

/// One live store per entity type over a single database.
#[derive(Debug)]
pub struct Stores {
    db: Database,
    appointments: LiveStore<AppointmentRepository>,
    gallery: LiveStore<GalleryRepository>,
    profile: LiveStore<ProfileRepository>,
    reviews: LiveStore<ReviewRepository>,
}

impl Stores {
    /// Opens the database described by `config` and starts every store.
    ///
    /// The database file's directory is created if missing.
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        ensure_data_dir(config)?;

        let db = Database::new(config.to_db_config()).await?;
        Ok(Self::from_database(db, config.store.write_queue_capacity))
    }

    /// Starts every store on an existing database handle.
    pub fn from_database(db: Database, queue_capacity: usize) -> Self {
        info!(queue_capacity, "Starting live stores");

        Stores {
            appointments: LiveStore::new(db.appointments(), queue_capacity),
            gallery: LiveStore::new(db.gallery(), queue_capacity),
            profile: LiveStore::new(db.profile(), queue_capacity),
            reviews: LiveStore::new(db.reviews(), queue_capacity),
            db,
        }
    }

    /// Returns the process-wide stores, creating them on first use.
    ///
    /// Built on [`Database::shared`]: the first successful caller's
    /// configuration wins.
    pub async fn shared(config: &StoreConfig) -> StoreResult<&'static Stores> {
        SHARED
            .get_or_try_init(|| async {
                ensure_data_dir(config)?;
                let db = Database::shared(config.to_db_config()).await?;
                Ok::<_, StoreError>(Stores::from_database(
                    db.clone(),
                    config.store.write_queue_capacity,
                ))
            })
            .await
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn appointments(&self) -> &LiveStore<AppointmentRepository> {
        &self.appointments
    }

    pub fn gallery(&self) -> &LiveStore<GalleryRepository> {
        &self.gallery
    }

    pub fn profile(&self) -> &LiveStore<ProfileRepository> {
        &self.profile
    }

    pub fn reviews(&self) -> &LiveStore<ReviewRepository> {
        &self.reviews
    }

    /// Drains every store's queue, then closes the database.
    pub async fn shutdown(&self) {
        tokio::join!(
            self.appointments.shutdown(),
            self.gallery.shutdown(),
            self.profile.shutdown(),
            self.reviews.shutdown(),
        );
        self.db.close().await;
        info!("All stores shut down");
    }
}

fn ensure_data_dir(config: &StoreConfig) -> StoreResult<()> {
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;
        }
    }
    Ok(())
}
