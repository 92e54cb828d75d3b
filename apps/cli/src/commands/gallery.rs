//! # Gallery Commands
//!
//! Uploading a picture reference and listing the gallery.

use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::output::{Listed, Render};
use mediroom_core::validation::validate_gallery_item;
use mediroom_core::{GalleryItem, RowId};
use mediroom_store::Stores;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemDto {
    pub id: Option<RowId>,
    pub image_uri: String,
    pub title: String,
    pub description: String,
}

impl From<GalleryItem> for GalleryItemDto {
    fn from(g: GalleryItem) -> Self {
        GalleryItemDto {
            id: g.id,
            image_uri: g.image_uri,
            title: g.title,
            description: g.description,
        }
    }
}

impl Render for GalleryItemDto {
    fn render(&self) -> String {
        let heading = if self.title.is_empty() {
            "(untitled)"
        } else {
            self.title.as_str()
        };
        if self.description.is_empty() {
            format!("{}  {}", heading, self.image_uri)
        } else {
            format!("{}  {}\n    {}", heading, self.image_uri, self.description)
        }
    }
}

impl Listed for GalleryItemDto {
    const EMPTY: &'static str = "No items in gallery.";
}

/// Adds a picture to the gallery.
///
/// ## Arguments
/// * `uri` - Where the picture lives; must be non-empty
/// * `title` - Short title, may be empty
/// * `description` - Caption, may be empty
pub async fn add_item(
    stores: &Stores,
    uri: &str,
    title: &str,
    description: &str,
) -> Result<GalleryItemDto, ApiError> {
    let mut item = GalleryItem::new(uri.trim(), description.trim()).with_title(title.trim());
    validate_gallery_item(&item)?;

    let outcome = stores.gallery().save_and_wait(item.clone()).await?;
    item.id = outcome.id();

    info!(id = ?item.id, uri = %item.image_uri, "Gallery item uploaded");
    Ok(item.into())
}

/// Lists gallery items, newest first.
pub async fn list_items(stores: &Stores) -> Result<Vec<GalleryItemDto>, ApiError> {
    let items = stores.gallery().loaded().await?;
    Ok(items.into_iter().map(GalleryItemDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{fresh_view, memory_stores};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_add_and_list() {
        let stores = memory_stores().await;

        add_item(&stores, "content://media/1", "", "Lobby")
            .await
            .unwrap();
        let added = add_item(&stores, " file:///x-ray.png ", "X-ray room", "")
            .await
            .unwrap();
        assert_eq!(added.image_uri, "file:///x-ray.png");

        let items = list_items(&fresh_view(&stores)).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].render(), "X-ray room  file:///x-ray.png");
        assert_eq!(items[1].render(), "(untitled)  content://media/1\n    Lobby");

        stores.shutdown().await;
    }

    #[tokio::test]
    async fn test_blank_uri_rejected() {
        let stores = memory_stores().await;

        let err = add_item(&stores, "   ", "Title", "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let items = list_items(&stores).await.unwrap();
        assert_eq!(items.render(), "No items in gallery.");
        stores.shutdown().await;
    }
}
