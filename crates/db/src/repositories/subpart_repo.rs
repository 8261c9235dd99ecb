//! Repository for the `subparts` table.

use sqlx::PgPool;
use vidnote_core::types::DbId;

use crate::models::subpart::{CreateSubpart, Subpart, UpdateSubpart};

/// Column list for subpart queries.
const SUBPART_COLUMNS: &str = "id, project_id, name, description, assigned_user_ids, \
    reviewer_ids, sequence_index, status, created_at, updated_at";

/// Provides CRUD operations for subparts.
pub struct SubpartRepo;

impl SubpartRepo {
    /// Insert a new subpart at the end of the project's ordering.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateSubpart,
    ) -> Result<Subpart, sqlx::Error> {
        let query = format!(
            "INSERT INTO subparts
                (project_id, name, description, assigned_user_ids, reviewer_ids, sequence_index)
             VALUES ($1, $2, $3, $4, $5,
                (SELECT COALESCE(MAX(sequence_index) + 1, 0) FROM subparts WHERE project_id = $1))
             RETURNING {SUBPART_COLUMNS}"
        );
        sqlx::query_as::<_, Subpart>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(input.description.as_deref().unwrap_or(""))
            .bind(&input.assigned_user_ids)
            .bind(&input.reviewer_ids)
            .fetch_one(pool)
            .await
    }

    /// Find a subpart by its ID, scoped to a project.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Subpart>, sqlx::Error> {
        let query =
            format!("SELECT {SUBPART_COLUMNS} FROM subparts WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Subpart>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List all subparts of a project, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Subpart>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBPART_COLUMNS} FROM subparts
             WHERE project_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Subpart>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateSubpart,
    ) -> Result<Option<Subpart>, sqlx::Error> {
        let query = format!(
            "UPDATE subparts SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                assigned_user_ids = COALESCE($6, assigned_user_ids),
                reviewer_ids = COALESCE($7, reviewer_ids),
                sequence_index = COALESCE($8, sequence_index),
                updated_at = now()
             WHERE id = $1 AND project_id = $2
             RETURNING {SUBPART_COLUMNS}"
        );
        sqlx::query_as::<_, Subpart>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.assigned_user_ids)
            .bind(&input.reviewer_ids)
            .bind(input.sequence_index)
            .fetch_optional(pool)
            .await
    }

    /// Delete a subpart, clearing the link on every video that referenced
    /// it. Videos survive; only the reference is removed.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM subparts WHERE id = $1 AND project_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?;

        if exists.is_none() {
            return Ok(false);
        }

        sqlx::query("UPDATE videos SET subpart_id = NULL, updated_at = now() WHERE subpart_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM subparts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
