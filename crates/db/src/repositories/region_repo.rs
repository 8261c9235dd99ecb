//! Repository for the `regions` table.
//!
//! Region mutations are annotation-content changes: each one runs the
//! approval reset for the owning video inside its own transaction.

use sqlx::PgPool;
use vidnote_core::annotation::DEFAULT_REGION_COLOR;
use vidnote_core::types::DbId;

use crate::error::DbError;
use crate::models::region::{CreateRegion, Region, UpdateRegion};
use crate::repositories::review_repo::ReviewRepo;

/// Column list for region queries.
const REGION_COLUMNS: &str = "id, segment_id, video_id, frame_time, brush_mask, \
    segmented_mask, label, color, category_id, category_name, created_by, created_at, \
    updated_at";

/// Provides CRUD operations for object regions.
pub struct RegionRepo;

impl RegionRepo {
    /// Insert a new region into a segment. The owning video id is
    /// denormalized from the segment row.
    pub async fn create(
        pool: &PgPool,
        segment_id: DbId,
        input: &CreateRegion,
    ) -> Result<Region, DbError> {
        let mut tx = pool.begin().await?;

        let video_id: Option<DbId> =
            sqlx::query_scalar("SELECT video_id FROM segments WHERE id = $1")
                .bind(segment_id)
                .fetch_optional(&mut *tx)
                .await?;
        let video_id = video_id.ok_or_else(|| DbError::not_found("Segment", segment_id))?;

        let query = format!(
            "INSERT INTO regions
                (segment_id, video_id, frame_time, brush_mask, segmented_mask, label,
                 color, category_id, category_name, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {REGION_COLUMNS}"
        );
        let region = sqlx::query_as::<_, Region>(&query)
            .bind(segment_id)
            .bind(video_id)
            .bind(input.frame_time)
            .bind(input.brush_mask.as_deref().unwrap_or(""))
            .bind(input.segmented_mask.as_deref().unwrap_or(""))
            .bind(input.label.as_deref().unwrap_or("Object"))
            .bind(input.color.as_deref().unwrap_or(DEFAULT_REGION_COLOR))
            .bind(input.category_id)
            .bind(input.category_name.as_deref().unwrap_or(""))
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        ReviewRepo::reset_approval_on_content_change(&mut tx, video_id).await?;
        tx.commit().await?;
        Ok(region)
    }

    /// Find a region by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Region>, sqlx::Error> {
        let query = format!("SELECT {REGION_COLUMNS} FROM regions WHERE id = $1");
        sqlx::query_as::<_, Region>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all regions of a segment, oldest first.
    pub async fn list_for_segment(
        pool: &PgPool,
        segment_id: DbId,
    ) -> Result<Vec<Region>, sqlx::Error> {
        let query = format!(
            "SELECT {REGION_COLUMNS} FROM regions
             WHERE segment_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Region>(&query)
            .bind(segment_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update, returning the updated row.
    ///
    /// Mask, label and frame-time changes reset an approved review state;
    /// a patch touching only the category label does not.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRegion,
    ) -> Result<Option<Region>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE regions SET
                label = COALESCE($2, label),
                color = COALESCE($3, color),
                brush_mask = COALESCE($4, brush_mask),
                segmented_mask = COALESCE($5, segmented_mask),
                frame_time = COALESCE($6, frame_time),
                category_name = COALESCE($7, category_name),
                updated_at = now()
             WHERE id = $1
             RETURNING {REGION_COLUMNS}"
        );
        let region = sqlx::query_as::<_, Region>(&query)
            .bind(id)
            .bind(&input.label)
            .bind(&input.color)
            .bind(&input.brush_mask)
            .bind(&input.segmented_mask)
            .bind(input.frame_time)
            .bind(&input.category_name)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(region) = region else {
            return Ok(None);
        };

        let touches_content = input.label.is_some()
            || input.color.is_some()
            || input.brush_mask.is_some()
            || input.segmented_mask.is_some()
            || input.frame_time.is_some();
        if touches_content {
            ReviewRepo::reset_approval_on_content_change(&mut tx, region.video_id).await?;
        }

        tx.commit().await?;
        Ok(Some(region))
    }

    /// Delete a region and the captions referencing it.
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let video_id: Option<DbId> =
            sqlx::query_scalar("SELECT video_id FROM regions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(video_id) = video_id else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM captions WHERE region_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM regions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        ReviewRepo::reset_approval_on_content_change(&mut tx, video_id).await?;
        tx.commit().await?;
        Ok(true)
    }
}
