//! # mediroom-core: Pure Domain Logic for MediRoom
//!
//! Entity definitions and caller-side rules shared by every other crate in the
//! workspace. Nothing in here touches a database, a file or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MediRoom Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Presentation (apps/cli)                        │   │
//! │  │   book ──► gallery add ──► profile save ──► review submit      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ validation happens here               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ mediroom-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │  catalog  │  │validation │                  │   │
//! │  │   │Appointment│  │  Doctor   │  │  rules    │                  │   │
//! │  │   │  Review   │  │ Specialty │  │  checks   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         mediroom-db / mediroom-store (persistence)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Appointment, GalleryItem, UserProfile, Review)
//! - [`catalog`] - Doctors offered by the booking screen
//! - [`validation`] - Input checks run by the caller before a save
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use mediroom_core::validation::validate_review_content;
//!
//! // Blank reviews never reach the store
//! assert!(validate_review_content("   ").is_err());
//!
//! // Accepted content comes back trimmed
//! assert_eq!(validate_review_content("  Great care ").unwrap(), "Great care");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Doctor, Specialty};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed identity of the single user profile row.
///
/// The profile table never holds more than this one row; every save replaces it.
pub const PROFILE_ID: RowId = 1;

/// Maximum length of a review body, in characters.
pub const MAX_REVIEW_LENGTH: usize = 2000;

/// Maximum length of free-text fields such as notes, bio and descriptions.
pub const MAX_TEXT_LENGTH: usize = 1000;
