//! # Review Commands
//!
//! Submitting and listing patient reviews.

use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::output::{Listed, Render};
use mediroom_core::validation::validate_review_content;
use mediroom_core::{Review, RowId, ValidationError};
use mediroom_db::InsertOutcome;
use mediroom_store::Stores;

/// Notice shown after a successful submission.
pub const SUBMITTED: &str = "Review submitted successfully!";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: Option<RowId>,
    pub content: String,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        ReviewDto {
            id: r.id,
            content: r.content,
        }
    }
}

impl Render for ReviewDto {
    fn render(&self) -> String {
        match self.id {
            Some(id) => format!("#{} {}", id, self.content),
            None => self.content.clone(),
        }
    }
}

impl Listed for ReviewDto {
    const EMPTY: &'static str = "No reviews yet.";
}

/// Result of a submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedReview {
    pub review: ReviewDto,
    pub message: String,
}

impl Render for SubmittedReview {
    fn render(&self) -> String {
        self.message.clone()
    }
}

/// Submits a review.
///
/// Blank text is rejected with "Review cannot be empty." before anything is
/// queued.
pub async fn submit_review(stores: &Stores, content: &str) -> Result<SubmittedReview, ApiError> {
    let content = validate_review_content(content).map_err(|e| match e {
        ValidationError::Required { .. } => ApiError::validation("Review cannot be empty."),
        other => other.into(),
    })?;

    let mut review = Review::new(content);
    let outcome = stores.reviews().save_and_wait(review.clone()).await?;

    // New reviews never carry an id, so the insert can't be ignored
    if let InsertOutcome::Written(id) = outcome {
        review.id = Some(id);
    }
    info!(id = ?review.id, "Review submitted");

    Ok(SubmittedReview {
        review: review.into(),
        message: SUBMITTED.to_string(),
    })
}

/// Lists reviews, newest first.
pub async fn list_reviews(stores: &Stores) -> Result<Vec<ReviewDto>, ApiError> {
    let reviews = stores.reviews().loaded().await?;
    Ok(reviews.into_iter().map(ReviewDto::from).collect())
}
