//! Segment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `segments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Segment {
    pub id: DbId,
    pub video_id: DbId,
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub sequence_index: i32,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Segment listing row with region/caption counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SegmentSummary {
    pub id: DbId,
    pub video_id: DbId,
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub sequence_index: i32,
    pub regions_count: i64,
    pub captions_count: i64,
    pub created_at: Timestamp,
}

/// DTO for creating a new segment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSegment {
    #[serde(default)]
    pub name: Option<String>,
    pub start_time: f64,
    pub end_time: f64,
    /// Filled in by the handler from the authenticated user.
    #[serde(skip)]
    pub created_by: DbId,
}

/// DTO for updating an existing segment. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSegment {
    pub name: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub sequence_index: Option<i32>,
}

/// Request body for the batch segment creation endpoint (auto-split).
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSegmentsRequest {
    pub segments: Vec<CreateSegment>,
    /// When true, existing segments (and their regions/captions) are
    /// cascaded away before the new set is inserted.
    #[serde(default)]
    pub replace: bool,
}
