//! # Validation Module
//!
//! Caller-side input checks. The store accepts any well-typed value it is
//! given, so these run in the presentation layer before a save is issued.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (apps/cli)                                      │
//! │  ├── Calls THIS MODULE before building an entity                       │
//! │  └── Maps ValidationError to a user-visible notice                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store (mediroom-store / mediroom-db)                         │
//! │  ├── NO business validation                                            │
//! │  └── NOT NULL constraints only                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mediroom_core::validation::{validate_image_uri, validate_review_content};
//!
//! assert!(validate_image_uri("content://media/external/images/42").is_ok());
//! assert!(validate_review_content("").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Appointment, GalleryItem, UserProfile};
use crate::{MAX_REVIEW_LENGTH, MAX_TEXT_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Helpers
// =============================================================================

fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Review
// =============================================================================

/// Validates review text and returns it trimmed.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_REVIEW_LENGTH`] characters after trimming
///
/// ## Example
/// ```rust
/// use mediroom_core::validation::validate_review_content;
///
/// assert_eq!(validate_review_content(" Kind nurses\n").unwrap(), "Kind nurses");
/// assert!(validate_review_content("\t ").is_err());
/// ```
pub fn validate_review_content(content: &str) -> ValidationResult<String> {
    let content = content.trim();
    require("content", content)?;
    max_len("content", content, MAX_REVIEW_LENGTH)?;
    Ok(content.to_string())
}

// =============================================================================
// Gallery
// =============================================================================

/// Validates an image reference.
///
/// The reference itself is opaque; only emptiness is checked.
pub fn validate_image_uri(uri: &str) -> ValidationResult<()> {
    require("imageUri", uri)
}

/// Validates a gallery item before upload.
pub fn validate_gallery_item(item: &GalleryItem) -> ValidationResult<()> {
    validate_image_uri(&item.image_uri)?;
    max_len("title", &item.title, MAX_TEXT_LENGTH)?;
    max_len("description", &item.description, MAX_TEXT_LENGTH)?;
    Ok(())
}

// =============================================================================
// Appointment
// =============================================================================

/// Validates the free-text parts of a booking.
///
/// Catalog membership (known doctor, offered slot) is checked separately by
/// [`crate::catalog::resolve_booking`].
pub fn validate_appointment(appt: &Appointment) -> ValidationResult<()> {
    require("doctorName", &appt.doctor_name)?;
    require("time", &appt.time)?;
    max_len("notes", &appt.notes, MAX_TEXT_LENGTH)?;
    Ok(())
}

// =============================================================================
// Profile
// =============================================================================

/// Validates an email address loosely: one '@' with text on both sides and a
/// dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(|| invalid("missing '@'"))?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid("expected name@domain"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(())
}

/// Validates a profile before it replaces the stored one.
///
/// ## Rules
/// - `name` is required
/// - `email` may be empty; otherwise it must look like an address
/// - `bio` at most [`MAX_TEXT_LENGTH`] characters
pub fn validate_profile(profile: &UserProfile) -> ValidationResult<()> {
    require("name", &profile.name)?;

    if !profile.email.trim().is_empty() {
        validate_email(&profile.email)?;
    }

    max_len("bio", &profile.bio, MAX_TEXT_LENGTH)?;
    Ok(())
}
