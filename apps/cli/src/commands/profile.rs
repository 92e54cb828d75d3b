//! # Profile Commands
//!
//! Showing and replacing the single user profile.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  profile save --name "Ana" [--image me.jpg]                             │
//! │       │                                                                 │
//! │       ├── --image given ──► read file bytes                             │
//! │       └── omitted ────────► keep the stored picture (if any)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_profile ──► VALIDATION_ERROR                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  profile().save_and_wait  (row 1 replaced as a whole)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use base64::Engine;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::output::Render;
use mediroom_core::validation::validate_profile;
use mediroom_core::UserProfile;
use mediroom_db::TableAccessor;
use mediroom_store::Stores;

/// Largest picture accepted from disk.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Profile DTO; the picture travels as standard base64.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub name: String,
    pub username: String,
    pub email: String,
    pub gender: String,
    pub bio: String,
    pub profile_image: Option<String>,
}

impl From<UserProfile> for ProfileDto {
    fn from(p: UserProfile) -> Self {
        let profile_image = p
            .profile_image
            .filter(|bytes| !bytes.is_empty())
            .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes));

        ProfileDto {
            name: p.name,
            username: p.username,
            email: p.email,
            gender: p.gender,
            bio: p.bio,
            profile_image,
        }
    }
}

impl Render for ProfileDto {
    fn render(&self) -> String {
        let picture = match &self.profile_image {
            Some(encoded) => format!("attached ({} base64 chars)", encoded.len()),
            None => "none".to_string(),
        };
        format!(
            "Name:     {}\nUsername: {}\nEmail:    {}\nGender:   {}\nBio:      {}\nPicture:  {}",
            self.name, self.username, self.email, self.gender, self.bio, picture
        )
    }
}

impl Render for Option<ProfileDto> {
    fn render(&self) -> String {
        match self {
            Some(profile) => profile.render(),
            None => "No profile saved.".to_string(),
        }
    }
}

/// Text fields of a profile save.
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub gender: String,
    pub bio: String,
}

/// Returns the stored profile, if one was ever saved.
pub async fn show_profile(stores: &Stores) -> Result<Option<ProfileDto>, ApiError> {
    let profile = stores.profile().loaded().await?;
    Ok(profile.map(ProfileDto::from))
}

/// Replaces the stored profile.
///
/// ## Arguments
/// * `input` - Text fields; `name` is required
/// * `image` - Picture file to attach; `None` keeps the stored picture,
///   read straight from the table so it is never an older snapshot's
pub async fn save_profile(
    stores: &Stores,
    input: ProfileInput,
    image: Option<&Path>,
) -> Result<ProfileDto, ApiError> {
    let profile_image = match image {
        Some(path) => Some(read_image(path).await?),
        None => {
            let existing = stores.database().profile().fetch().await?;
            existing.and_then(|p| p.profile_image)
        }
    };

    let profile = UserProfile {
        name: input.name.trim().to_string(),
        username: input.username.trim().to_string(),
        email: input.email.trim().to_string(),
        gender: input.gender.trim().to_string(),
        bio: input.bio.trim().to_string(),
        profile_image,
    };
    validate_profile(&profile)?;

    stores.profile().save_and_wait(profile.clone()).await?;
    info!(name = %profile.name, has_image = profile.has_image(), "Profile saved");

    Ok(profile.into())
}

async fn read_image(path: &Path) -> Result<Vec<u8>, ApiError> {
    let unreadable =
        |e: std::io::Error| ApiError::validation(format!("Image could not be read: {}", e));

    let size = tokio::fs::metadata(path).await.map_err(unreadable)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(ApiError::validation(format!(
            "Image must be at most {} MB.",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    let bytes = tokio::fs::read(path).await.map_err(unreadable)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read profile picture");
    Ok(bytes)
}
