//! Object-region entity model and DTOs.
//!
//! Mask payloads are opaque base64 strings produced by the external
//! segmentation pipeline; this layer never interprets them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `regions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Region {
    pub id: DbId,
    pub segment_id: DbId,
    pub video_id: DbId,
    pub frame_time: f64,
    pub brush_mask: String,
    pub segmented_mask: String,
    pub label: String,
    pub color: String,
    pub category_id: Option<DbId>,
    pub category_name: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new region inside a segment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRegion {
    #[serde(default)]
    pub frame_time: f64,
    #[serde(default)]
    pub brush_mask: Option<String>,
    #[serde(default)]
    pub segmented_mask: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub category_name: Option<String>,
    /// Filled in by the handler from the authenticated user.
    #[serde(skip)]
    pub created_by: DbId,
}

/// DTO for updating an existing region. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRegion {
    pub label: Option<String>,
    pub color: Option<String>,
    pub brush_mask: Option<String>,
    pub segmented_mask: Option<String>,
    pub frame_time: Option<f64>,
    pub category_name: Option<String>,
}
