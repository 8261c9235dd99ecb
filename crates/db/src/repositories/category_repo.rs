//! Repository for the `categories` table.
//!
//! Category deletion dereferences: regions keep their rows and only lose
//! the category fields. Category changes never touch review state.

use sqlx::PgPool;
use vidnote_core::types::DbId;

use crate::models::category::{Category, CreateCategory, UpdateCategory};

/// Column list for category queries.
const CATEGORY_COLUMNS: &str = "id, project_id, name, description, color, created_by, created_at";

/// Provides CRUD operations for object categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category. Duplicate names within a project surface as
    /// a unique-constraint violation (`uq_categories_project_name`).
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateCategory,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (project_id, name, description, color, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(input.description.as_deref().unwrap_or(""))
            .bind(input.color.as_deref().unwrap_or("#3b82f6"))
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's categories, alphabetically.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE project_id = $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                color = COALESCE($4, color)
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category, clearing the category fields on every region
    /// that referenced it. Regions survive.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE regions SET category_id = NULL, category_name = '', updated_at = now()
             WHERE category_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        tx.commit().await?;
        Ok(deleted)
    }
}
