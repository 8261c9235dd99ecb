//! Video entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub project_id: DbId,
    pub subpart_id: Option<DbId>,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub thumbnail: String,
    pub duration: f64,
    pub width: i32,
    pub height: i32,
    pub status: String,
    pub current_step: i32,
    pub annotator_ids: Vec<DbId>,
    pub tag_ids: Vec<DbId>,
    pub uploaded_by: DbId,
    pub review_status: String,
    pub review_comment: String,
    pub reviewed_by: Option<DbId>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Video listing row with annotation statistics.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoSummary {
    pub id: DbId,
    pub project_id: DbId,
    pub subpart_id: Option<DbId>,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub thumbnail: String,
    pub duration: f64,
    pub width: i32,
    pub height: i32,
    pub status: String,
    pub current_step: i32,
    pub tag_ids: Vec<DbId>,
    pub uploaded_by: DbId,
    pub review_status: String,
    pub review_comment: String,
    pub reviewed_by: Option<DbId>,
    pub segments_count: i64,
    pub regions_count: i64,
    pub captions_count: i64,
    pub created_at: Timestamp,
}

/// DTO for registering an uploaded video. The binary itself is stored by
/// the external upload service; only metadata lands here.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideo {
    pub project_id: DbId,
    #[serde(default)]
    pub subpart_id: Option<DbId>,
    pub filename: String,
    pub original_name: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    /// Filled in by the handler from the authenticated user.
    #[serde(skip)]
    pub uploaded_by: DbId,
}

/// DTO for updating an existing video.
///
/// `duration`, `width`, `height`, `status` and `current_step` are
/// content-bearing: changing any of them resets an approved review state.
/// `subpart_id` uses a double option so a JSON `null` clears the link while
/// an absent field leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVideo {
    pub duration: Option<f64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub status: Option<String>,
    pub current_step: Option<i32>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub subpart_id: Option<Option<DbId>>,
    pub tag_ids: Option<Vec<DbId>>,
    pub annotator_ids: Option<Vec<DbId>>,
}

impl UpdateVideo {
    /// Whether this patch touches any content-bearing field and must
    /// therefore trigger the approval reset on an approved video.
    pub fn touches_content(&self) -> bool {
        self.duration.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.status.is_some()
            || self.current_step.is_some()
    }
}
