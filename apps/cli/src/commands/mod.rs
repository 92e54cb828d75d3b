//! # CLI Commands Module
//!
//! One module per command group. Handlers take the state they need
//! (`&Stores`, `&Database`, or nothing) and return DTOs or [`ApiError`].
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── doctors.rs      ◄─── Doctor catalog
//! ├── appointment.rs  ◄─── Booking, listing
//! ├── gallery.rs      ◄─── Picture upload, listing
//! ├── profile.rs      ◄─── Profile show/replace
//! ├── review.rs       ◄─── Review submit, listing
//! ├── watch.rs        ◄─── Follow a table's snapshots
//! ├── db.rs           ◄─── Schema and row-count status
//! └── config.rs       ◄─── Configuration show/init
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  mediroom review submit "Kind nurses"                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  validate input (mediroom-core)  ──► ApiError::validation               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stores.reviews().save_and_wait(..)  (FIFO queue, commit)               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ReviewDto / notice ──► output::emit (text or JSON)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`ApiError`]: crate::error::ApiError

pub mod appointment;
pub mod config;
pub mod db;
pub mod doctors;
pub mod gallery;
pub mod profile;
pub mod review;
pub mod watch;
