//! Subpart entity model and DTOs.
//!
//! A subpart is a work-assignment grouping of videos within a project. Its
//! `reviewer_ids` set is the required-reviewer set for the review consensus
//! of every video assigned to it; an empty set means any single reviewer's
//! approval suffices.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `subparts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subpart {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub assigned_user_ids: Vec<DbId>,
    pub reviewer_ids: Vec<DbId>,
    pub sequence_index: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new subpart.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubpart {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_user_ids: Vec<DbId>,
    #[serde(default)]
    pub reviewer_ids: Vec<DbId>,
}

/// DTO for updating an existing subpart. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubpart {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assigned_user_ids: Option<Vec<DbId>>,
    pub reviewer_ids: Option<Vec<DbId>>,
    pub sequence_index: Option<i32>,
}
