//! Video tag model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub color: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new tag.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// DTO for updating an existing tag. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<String>,
}
