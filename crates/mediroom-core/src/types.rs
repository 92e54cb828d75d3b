//! # Domain Types
//!
//! The four entities persisted by MediRoom.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  Appointment    │   │  GalleryItem    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  id (auto)      │   │  id (auto)      │                             │
//! │  │  doctor_name    │   │  image_uri      │                             │
//! │  │  time           │   │  title          │                             │
//! │  │  notes          │   │  description    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  UserProfile    │   │     Review      │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  (row id = 1)   │   │  id (auto)      │                             │
//! │  │  name, email... │   │  content        │                             │
//! │  │  profile_image  │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Auto-assigned entities carry `id: Option<RowId>`. `None` lets the table pick
//! the next identity; `Some(id)` addresses an existing row explicitly, which is
//! how the conflict policies (replace vs ignore) come into play. Rows read back
//! from storage always have `Some(id)`.
//!
//! The entities never reference one another.

use serde::{Deserialize, Serialize};

/// Integer row identity as stored by SQLite.
pub type RowId = i64;

// =============================================================================
// Appointment
// =============================================================================

/// A booked appointment with a doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Appointment {
    /// Auto-assigned identity, immutable once assigned.
    pub id: Option<RowId>,

    /// Display name of the doctor, e.g. "Dr. Jane Smith".
    #[cfg_attr(feature = "sqlx", sqlx(rename = "doctorName"))]
    pub doctor_name: String,

    /// Free-form time slot, e.g. "09:00 AM".
    pub time: String,

    /// Optional notes; empty when the patient left none.
    pub notes: String,
}

impl Appointment {
    /// Creates an appointment that has not been stored yet.
    pub fn new(
        doctor_name: impl Into<String>,
        time: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Appointment {
            id: None,
            doctor_name: doctor_name.into(),
            time: time.into(),
            notes: notes.into(),
        }
    }

    /// Targets an explicit identity.
    pub fn with_id(mut self, id: RowId) -> Self {
        self.id = Some(id);
        self
    }
}

// =============================================================================
// Gallery Item
// =============================================================================

/// An uploaded gallery picture.
///
/// Only the reference to the image is stored; the bytes behind `image_uri`
/// belong to whoever provided the URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct GalleryItem {
    pub id: Option<RowId>,

    /// URI or path of the picture. Must be non-empty (checked by the caller).
    #[cfg_attr(feature = "sqlx", sqlx(rename = "imageUri"))]
    pub image_uri: String,

    /// Short title; empty for items uploaded before titles existed.
    pub title: String,

    pub description: String,
}

impl GalleryItem {
    /// Creates an untitled gallery item that has not been stored yet.
    pub fn new(image_uri: impl Into<String>, description: impl Into<String>) -> Self {
        GalleryItem {
            id: None,
            image_uri: image_uri.into(),
            title: String::new(),
            description: description.into(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Targets an explicit identity.
    pub fn with_id(mut self, id: RowId) -> Self {
        self.id = Some(id);
        self
    }
}

// =============================================================================
// User Profile
// =============================================================================

/// The device owner's profile.
///
/// There is exactly zero or one profile. It has no `id` field because its
/// identity is always [`crate::PROFILE_ID`]; a save replaces every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub username: String,
    pub email: String,
    pub gender: String,
    pub bio: String,

    /// Encoded picture bytes, opaque to the store.
    pub profile_image: Option<Vec<u8>>,
}

impl UserProfile {
    /// Returns true if a picture is attached.
    pub fn has_image(&self) -> bool {
        self.profile_image.as_ref().is_some_and(|bytes| !bytes.is_empty())
    }
}

// =============================================================================
// Review
// =============================================================================

/// A free-text review submitted by a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Review {
    pub id: Option<RowId>,

    /// Review body, non-blank (checked by the caller).
    pub content: String,
}

impl Review {
    /// Creates a review that has not been stored yet.
    pub fn new(content: impl Into<String>) -> Self {
        Review {
            id: None,
            content: content.into(),
        }
    }

    /// Targets an explicit identity.
    pub fn with_id(mut self, id: RowId) -> Self {
        self.id = Some(id);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entities_have_no_identity() {
        assert_eq!(Appointment::new("Dr. Jane Smith", "09:00 AM", "").id, None);
        assert_eq!(GalleryItem::new("content://img/1", "Lobby").id, None);
        assert_eq!(Review::new("Friendly staff").id, None);
    }

    #[test]
    fn test_with_id() {
        let review = Review::new("Clean rooms").with_id(7);
        assert_eq!(review.id, Some(7));
    }

    #[test]
    fn test_gallery_item_defaults_to_empty_title() {
        let item = GalleryItem::new("file:///x.jpg", "Reception");
        assert!(item.title.is_empty());

        let item = item.with_title("Front desk");
        assert_eq!(item.title, "Front desk");
    }

    #[test]
    fn test_profile_has_image() {
        let mut profile = UserProfile::default();
        assert!(!profile.has_image());

        profile.profile_image = Some(Vec::new());
        assert!(!profile.has_image());

        profile.profile_image = Some(vec![0xFF, 0xD8, 0xFF]);
        assert!(profile.has_image());
    }

    #[test]
    fn test_appointment_serializes_snake_case() {
        let appt = Appointment::new("Dr. Michael Lee", "10:30 AM", "follow-up");
        let json = serde_json::to_value(&appt).unwrap();
        assert_eq!(json["doctor_name"], "Dr. Michael Lee");
        assert_eq!(json["id"], serde_json::Value::Null);
    }
}
