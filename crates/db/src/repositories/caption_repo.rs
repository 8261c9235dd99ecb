//! Repository for the `captions` table.
//!
//! Caption mutations are annotation-content changes: each one runs the
//! approval reset for the owning video inside its own transaction.
//!
//! Creation is an upsert against the partial unique indexes (one caption
//! per region, one segment-level caption per segment), matching the
//! create-or-update behaviour the annotation UI expects.

use sqlx::PgPool;
use vidnote_core::types::DbId;

use crate::error::DbError;
use crate::models::caption::{Caption, CreateCaption, UpdateCaption};
use crate::repositories::review_repo::ReviewRepo;

/// Column list for caption queries.
const CAPTION_COLUMNS: &str = "id, segment_id, video_id, region_id, visual_caption, \
    contextual_caption, knowledge_caption, combined_caption, visual_caption_vi, \
    contextual_caption_vi, knowledge_caption_vi, combined_caption_vi, created_by, \
    created_at, updated_at";

/// Provides CRUD operations for captions.
pub struct CaptionRepo;

impl CaptionRepo {
    /// Create a caption, or update the existing one for the same target
    /// (region, or segment-level when `region_id` is absent). Fields not
    /// present in the input keep their stored values on update.
    pub async fn create_or_update(
        pool: &PgPool,
        input: &CreateCaption,
    ) -> Result<Caption, DbError> {
        let mut tx = pool.begin().await?;

        // The owning video is derived from the segment row, so a caption
        // can never reference a video its segment does not belong to.
        let video_id: Option<DbId> =
            sqlx::query_scalar("SELECT video_id FROM segments WHERE id = $1")
                .bind(input.segment_id)
                .fetch_optional(&mut *tx)
                .await?;
        let video_id = video_id.ok_or_else(|| DbError::not_found("Segment", input.segment_id))?;

        let conflict_target = if input.region_id.is_some() {
            "(region_id) WHERE region_id IS NOT NULL"
        } else {
            "(segment_id) WHERE region_id IS NULL"
        };

        let query = format!(
            "INSERT INTO captions
                (segment_id, video_id, region_id,
                 visual_caption, contextual_caption, knowledge_caption, combined_caption,
                 visual_caption_vi, contextual_caption_vi, knowledge_caption_vi,
                 combined_caption_vi, created_by)
             VALUES ($1, $2, $3,
                 COALESCE($4, ''), COALESCE($5, ''), COALESCE($6, ''), COALESCE($7, ''),
                 COALESCE($8, ''), COALESCE($9, ''), COALESCE($10, ''), COALESCE($11, ''),
                 $12)
             ON CONFLICT {conflict_target} DO UPDATE SET
                 visual_caption = COALESCE($4, captions.visual_caption),
                 contextual_caption = COALESCE($5, captions.contextual_caption),
                 knowledge_caption = COALESCE($6, captions.knowledge_caption),
                 combined_caption = COALESCE($7, captions.combined_caption),
                 visual_caption_vi = COALESCE($8, captions.visual_caption_vi),
                 contextual_caption_vi = COALESCE($9, captions.contextual_caption_vi),
                 knowledge_caption_vi = COALESCE($10, captions.knowledge_caption_vi),
                 combined_caption_vi = COALESCE($11, captions.combined_caption_vi),
                 updated_at = now()
             RETURNING {CAPTION_COLUMNS}"
        );
        let caption = sqlx::query_as::<_, Caption>(&query)
            .bind(input.segment_id)
            .bind(video_id)
            .bind(input.region_id)
            .bind(&input.visual_caption)
            .bind(&input.contextual_caption)
            .bind(&input.knowledge_caption)
            .bind(&input.combined_caption)
            .bind(&input.visual_caption_vi)
            .bind(&input.contextual_caption_vi)
            .bind(&input.knowledge_caption_vi)
            .bind(&input.combined_caption_vi)
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        ReviewRepo::reset_approval_on_content_change(&mut tx, caption.video_id).await?;
        tx.commit().await?;
        Ok(caption)
    }

    /// Find a caption by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Caption>, sqlx::Error> {
        let query = format!("SELECT {CAPTION_COLUMNS} FROM captions WHERE id = $1");
        sqlx::query_as::<_, Caption>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all captions of a segment (region-level and segment-level).
    pub async fn list_for_segment(
        pool: &PgPool,
        segment_id: DbId,
    ) -> Result<Vec<Caption>, sqlx::Error> {
        let query = format!(
            "SELECT {CAPTION_COLUMNS} FROM captions
             WHERE segment_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Caption>(&query)
            .bind(segment_id)
            .fetch_all(pool)
            .await
    }

    /// Find the segment-level caption of a segment (no region link).
    pub async fn find_segment_level(
        pool: &PgPool,
        segment_id: DbId,
    ) -> Result<Option<Caption>, sqlx::Error> {
        let query = format!(
            "SELECT {CAPTION_COLUMNS} FROM captions
             WHERE segment_id = $1 AND region_id IS NULL"
        );
        sqlx::query_as::<_, Caption>(&query)
            .bind(segment_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the caption attached to a region.
    pub async fn find_for_region(
        pool: &PgPool,
        region_id: DbId,
    ) -> Result<Option<Caption>, sqlx::Error> {
        let query = format!("SELECT {CAPTION_COLUMNS} FROM captions WHERE region_id = $1");
        sqlx::query_as::<_, Caption>(&query)
            .bind(region_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCaption,
    ) -> Result<Option<Caption>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE captions SET
                visual_caption = COALESCE($2, visual_caption),
                contextual_caption = COALESCE($3, contextual_caption),
                knowledge_caption = COALESCE($4, knowledge_caption),
                combined_caption = COALESCE($5, combined_caption),
                visual_caption_vi = COALESCE($6, visual_caption_vi),
                contextual_caption_vi = COALESCE($7, contextual_caption_vi),
                knowledge_caption_vi = COALESCE($8, knowledge_caption_vi),
                combined_caption_vi = COALESCE($9, combined_caption_vi),
                updated_at = now()
             WHERE id = $1
             RETURNING {CAPTION_COLUMNS}"
        );
        let caption = sqlx::query_as::<_, Caption>(&query)
            .bind(id)
            .bind(&input.visual_caption)
            .bind(&input.contextual_caption)
            .bind(&input.knowledge_caption)
            .bind(&input.combined_caption)
            .bind(&input.visual_caption_vi)
            .bind(&input.contextual_caption_vi)
            .bind(&input.knowledge_caption_vi)
            .bind(&input.combined_caption_vi)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(caption) = caption else {
            return Ok(None);
        };

        ReviewRepo::reset_approval_on_content_change(&mut tx, caption.video_id).await?;
        tx.commit().await?;
        Ok(Some(caption))
    }

    /// Delete a caption.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let video_id: Option<DbId> =
            sqlx::query_scalar("DELETE FROM captions WHERE id = $1 RETURNING video_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(video_id) = video_id else {
            return Ok(false);
        };

        ReviewRepo::reset_approval_on_content_change(&mut tx, video_id).await?;
        tx.commit().await?;
        Ok(true)
    }
}
