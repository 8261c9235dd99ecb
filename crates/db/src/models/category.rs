//! Object-category model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Filled in by the handler from the authenticated user.
    #[serde(skip)]
    pub created_by: DbId,
}

/// DTO for updating an existing category. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}
