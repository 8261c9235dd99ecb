//! Review vote models and DTOs.
//!
//! Votes are stored one row per reviewer per video; the derived consensus
//! status lives on the video row and is recomputed by `ReviewRepo` inside
//! the same transaction as every vote change.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `video_reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoReview {
    pub id: DbId,
    pub video_id: DbId,
    pub reviewer_id: DbId,
    pub action: String,
    pub comment: String,
    pub decided_at: Timestamp,
}

/// Request body for the cast-vote endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CastVoteRequest {
    /// `"approve"` or `"reject"`.
    pub action: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Request body for the revoke-approval endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RevokeApprovalRequest {
    pub reason: String,
}

/// Review state returned by every review-workflow operation.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewState {
    pub review_status: String,
    pub reviews: Vec<VideoReview>,
}
