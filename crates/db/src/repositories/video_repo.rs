//! Repository for the `videos` table, including the video-level cascading
//! delete and the content-change hook on updates.

use sqlx::PgPool;
use vidnote_core::types::DbId;

use crate::models::video::{CreateVideo, UpdateVideo, Video, VideoSummary};
use crate::repositories::review_repo::ReviewRepo;

/// Column list for video queries.
pub(crate) const VIDEO_COLUMNS: &str = "id, project_id, subpart_id, filename, original_name, \
    file_path, file_size, thumbnail, duration, width, height, status, current_step, \
    annotator_ids, tag_ids, uploaded_by, review_status, review_comment, reviewed_by, \
    reviewed_at, created_at, updated_at";

/// Column list for video summary queries (with annotation statistics).
const SUMMARY_COLUMNS: &str = "v.id, v.project_id, v.subpart_id, v.filename, v.original_name, \
    v.file_size, v.thumbnail, v.duration, v.width, v.height, v.status, v.current_step, \
    v.tag_ids, v.uploaded_by, v.review_status, v.review_comment, v.reviewed_by, \
    (SELECT COUNT(*) FROM segments s WHERE s.video_id = v.id) AS segments_count, \
    (SELECT COUNT(*) FROM regions r WHERE r.video_id = v.id) AS regions_count, \
    (SELECT COUNT(*) FROM captions c WHERE c.video_id = v.id) AS captions_count, \
    v.created_at";

/// Provides CRUD operations for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Register a new uploaded video, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos
                (project_id, subpart_id, filename, original_name, file_path, file_size,
                 thumbnail, duration, width, height, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(input.project_id)
            .bind(input.subpart_id)
            .bind(&input.filename)
            .bind(&input.original_name)
            .bind(input.file_path.as_deref().unwrap_or(""))
            .bind(input.file_size.unwrap_or(0))
            .bind(input.thumbnail.as_deref().unwrap_or(""))
            .bind(input.duration.unwrap_or(0.0))
            .bind(input.width.unwrap_or(0))
            .bind(input.height.unwrap_or(0))
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    /// Find a video by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's videos with annotation statistics, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<VideoSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM videos v
             WHERE v.project_id = $1
             ORDER BY v.created_at DESC"
        );
        sqlx::query_as::<_, VideoSummary>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List a subpart's videos with annotation statistics, newest first.
    pub async fn list_for_subpart(
        pool: &PgPool,
        subpart_id: DbId,
    ) -> Result<Vec<VideoSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM videos v
             WHERE v.subpart_id = $1
             ORDER BY v.created_at DESC"
        );
        sqlx::query_as::<_, VideoSummary>(&query)
            .bind(subpart_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update, returning the updated row.
    ///
    /// When the patch touches a content-bearing field (duration,
    /// dimensions, processing step, status), an `approved` review state is
    /// reset in the same transaction, so a reader can never observe the
    /// new content alongside the stale approval.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE videos SET
                duration = COALESCE($2, duration),
                width = COALESCE($3, width),
                height = COALESCE($4, height),
                status = COALESCE($5, status),
                current_step = COALESCE($6, current_step),
                tag_ids = COALESCE($7, tag_ids),
                annotator_ids = COALESCE($8, annotator_ids),
                updated_at = now()
             WHERE id = $1
             RETURNING {VIDEO_COLUMNS}"
        );
        let video = sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(input.duration)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.status)
            .bind(input.current_step)
            .bind(&input.tag_ids)
            .bind(&input.annotator_ids)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(mut video) = video else {
            return Ok(None);
        };

        // COALESCE cannot clear a nullable column, so the subpart link is
        // patched separately when present (null clears it).
        if let Some(subpart_id) = input.subpart_id {
            let query = format!(
                "UPDATE videos SET subpart_id = $2, updated_at = now()
                 WHERE id = $1
                 RETURNING {VIDEO_COLUMNS}"
            );
            video = sqlx::query_as::<_, Video>(&query)
                .bind(id)
                .bind(subpart_id)
                .fetch_one(&mut *tx)
                .await?;
        }

        if input.touches_content() {
            let reset = ReviewRepo::reset_approval_on_content_change(&mut tx, id).await?;
            if reset {
                let query = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1");
                video = sqlx::query_as::<_, Video>(&query)
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(video))
    }

    /// Delete a video and everything it owns: segments, regions, captions
    /// and review votes. Descendant ids are resolved before any deletion;
    /// rows are deleted leaf-first inside one transaction.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let segment_ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM segments WHERE video_id = $1")
                .bind(id)
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
        sqlx::query("DELETE FROM video_reviews WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        tx.commit().await?;

        if deleted {
            tracing::info!(
                video_id = id,
                segments = segment_ids.len(),
                "Video cascade delete complete"
            );
        }

        Ok(deleted)
    }
}
