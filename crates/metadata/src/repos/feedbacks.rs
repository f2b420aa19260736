//! Feedback repository.

use crate::error::MetadataResult;
use crate::models::{FeedbackRow, NewFeedback};
use async_trait::async_trait;
use clientpulse_core::RatingStats;
use time::OffsetDateTime;

/// Repository for feedback submissions.
#[async_trait]
pub trait FeedbackRepo: Send + Sync {
    /// Insert a feedback row.
    async fn create_feedback(&self, feedback: &NewFeedback) -> MetadataResult<FeedbackRow>;

    /// Get a feedback row by ID.
    async fn get_feedback(&self, id: i64) -> MetadataResult<Option<FeedbackRow>>;

    /// Count all feedback rows.
    async fn count_feedbacks(&self) -> MetadataResult<i64>;

    /// Count and average rating of rows created at or after `since`
    /// (all rows when `None`).
    async fn rating_stats(&self, since: Option<OffsetDateTime>) -> MetadataResult<RatingStats>;

    /// Number of rows per rating value. Ratings with no rows are omitted.
    async fn rating_counts(&self) -> MetadataResult<Vec<(i32, i64)>>;

    /// List rows newest first. `limit: None` returns everything after `offset`.
    async fn list_feedbacks(
        &self,
        offset: i64,
        limit: Option<i64>,
    ) -> MetadataResult<Vec<FeedbackRow>>;
}
