//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub status: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Project listing row with subpart/video counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectSummary {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub status: String,
    pub created_by: DbId,
    pub subpart_count: i64,
    pub video_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Filled in by the handler from the authenticated user.
    #[serde(skip)]
    pub created_by: DbId,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}
