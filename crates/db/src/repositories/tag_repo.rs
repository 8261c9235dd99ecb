//! Repository for the `tags` table.
//!
//! Tag deletion dereferences: the id is removed from every video's tag
//! collection. Tag changes never touch review state.

use sqlx::PgPool;
use vidnote_core::types::DbId;

use crate::models::tag::{CreateTag, Tag, UpdateTag};

/// Column list for tag queries.
const TAG_COLUMNS: &str = "id, project_id, name, color, created_at";

/// Provides CRUD operations for video tags.
pub struct TagRepo;

impl TagRepo {
    /// Insert a new tag. Duplicate names within a project surface as a
    /// unique-constraint violation (`uq_tags_project_name`).
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateTag,
    ) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (project_id, name, color)
             VALUES ($1, $2, $3)
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(input.color.as_deref().unwrap_or("#3b82f6"))
            .fetch_one(pool)
            .await
    }

    /// Find a tag by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's tags, alphabetically.
    pub async fn list_for_project(pool: &PgPool, project_id: DbId) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT {TAG_COLUMNS} FROM tags
             WHERE project_id = $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTag,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!(
            "UPDATE tags SET
                name = COALESCE($2, name),
                color = COALESCE($3, color)
             WHERE id = $1
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Delete a tag, removing it from every video's tag collection.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE videos SET tag_ids = array_remove(tag_ids, $1), updated_at = now()
             WHERE $1 = ANY(tag_ids)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        tx.commit().await?;
        Ok(deleted)
    }
}
