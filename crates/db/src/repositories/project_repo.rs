//! Repository for the `projects` table, including the project-level
//! cascading delete.

use sqlx::PgPool;
use vidnote_core::types::DbId;

use crate::models::project::{CreateProject, Project, ProjectSummary, UpdateProject};

/// Column list for project queries.
const PROJECT_COLUMNS: &str = "id, name, description, status, created_by, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(input.description.as_deref().unwrap_or(""))
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects with subpart/video counts, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProjectSummary>(
            "SELECT
                p.id, p.name, p.description, p.status, p.created_by,
                (SELECT COUNT(*) FROM subparts s WHERE s.project_id = p.id) AS subpart_count,
                (SELECT COUNT(*) FROM videos v WHERE v.project_id = p.id) AS video_count,
                p.created_at, p.updated_at
             FROM projects p
             ORDER BY p.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Apply a partial update, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                updated_at = now()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project and everything it owns: videos (with their
    /// segments, regions, captions and review votes), subparts, categories
    /// and tags.
    ///
    /// Descendant id sets are resolved before any deletion begins, then
    /// rows are deleted leaf-first inside one transaction. Returns `false`
    /// when the project did not exist (the cascade deletes nothing).
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let video_ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM videos WHERE project_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let segment_ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM segments WHERE video_id = ANY($1)")
                .bind(&video_ids)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM captions WHERE segment_id = ANY($1)")
            .bind(&segment_ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM regions WHERE segment_id = ANY($1)")
            .bind(&segment_ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM segments WHERE id = ANY($1)")
            .bind(&segment_ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM video_reviews WHERE video_id = ANY($1)")
            .bind(&video_ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM videos WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM subparts WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM categories WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tags WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        tx.commit().await?;

        if deleted {
            tracing::info!(
                project_id = id,
                videos = video_ids.len(),
                segments = segment_ids.len(),
                "Project cascade delete complete"
            );
        }

        Ok(deleted)
    }
}
