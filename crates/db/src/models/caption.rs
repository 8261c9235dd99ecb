//! Caption entity model and DTOs.
//!
//! A caption belongs to a segment; when `region_id` is set it describes a
//! single object region, otherwise it is the segment-level caption. Each
//! caption kind carries an English field and a Vietnamese counterpart.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `captions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Caption {
    pub id: DbId,
    pub segment_id: DbId,
    pub video_id: DbId,
    pub region_id: Option<DbId>,
    pub visual_caption: String,
    pub contextual_caption: String,
    pub knowledge_caption: String,
    pub combined_caption: String,
    pub visual_caption_vi: String,
    pub contextual_caption_vi: String,
    pub knowledge_caption_vi: String,
    pub combined_caption_vi: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for the create-or-update caption endpoint.
///
/// Creation is idempotent per target: a second create for the same region
/// (or the same segment, for segment-level captions) updates the existing
/// row instead of inserting a duplicate.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCaption {
    pub segment_id: DbId,
    pub video_id: DbId,
    #[serde(default)]
    pub region_id: Option<DbId>,
    #[serde(default)]
    pub visual_caption: Option<String>,
    #[serde(default)]
    pub contextual_caption: Option<String>,
    #[serde(default)]
    pub knowledge_caption: Option<String>,
    #[serde(default)]
    pub combined_caption: Option<String>,
    #[serde(default)]
    pub visual_caption_vi: Option<String>,
    #[serde(default)]
    pub contextual_caption_vi: Option<String>,
    #[serde(default)]
    pub knowledge_caption_vi: Option<String>,
    #[serde(default)]
    pub combined_caption_vi: Option<String>,
    /// Filled in by the handler from the authenticated user.
    #[serde(skip)]
    pub created_by: DbId,
}

/// DTO for updating an existing caption. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCaption {
    pub visual_caption: Option<String>,
    pub contextual_caption: Option<String>,
    pub knowledge_caption: Option<String>,
    pub combined_caption: Option<String>,
    pub visual_caption_vi: Option<String>,
    pub contextual_caption_vi: Option<String>,
    pub knowledge_caption_vi: Option<String>,
    pub combined_caption_vi: Option<String>,
}
