//! Repository for the `segments` table, including batch creation
//! (auto-split) and the segment-level cascading delete.

use sqlx::PgPool;
use vidnote_core::types::DbId;

use crate::models::segment::{CreateSegment, Segment, SegmentSummary, UpdateSegment};

/// Column list for segment queries.
const SEGMENT_COLUMNS: &str = "id, video_id, name, start_time, end_time, sequence_index, \
    created_by, created_at, updated_at";

/// Provides CRUD operations for video segments.
pub struct SegmentRepo;

impl SegmentRepo {
    /// Insert a new segment at the end of the video's ordering. An omitted
    /// name defaults to `Segment N`.
    pub async fn create(
        pool: &PgPool,
        video_id: DbId,
        input: &CreateSegment,
    ) -> Result<Segment, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let next_index: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_index) + 1, 0) FROM segments WHERE video_id = $1",
        )
        .bind(video_id)
        .fetch_one(&mut *tx)
        .await?;

        let name = match &input.name {
            Some(name) => name.clone(),
            None => format!("Segment {}", next_index + 1),
        };

        let query = format!(
            "INSERT INTO segments
                (video_id, name, start_time, end_time, sequence_index, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SEGMENT_COLUMNS}"
        );
        let segment = sqlx::query_as::<_, Segment>(&query)
            .bind(video_id)
            .bind(&name)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(next_index)
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(segment)
    }

    /// Replace or extend a video's segments in one batch (auto-split).
    ///
    /// With `replace = true` the existing segments are cascaded away
    /// (regions and captions included) before the new set is inserted, all
    /// inside one transaction.
    pub async fn create_batch(
        pool: &PgPool,
        video_id: DbId,
        inputs: &[CreateSegment],
        replace: bool,
    ) -> Result<Vec<Segment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if replace {
            let old_ids: Vec<DbId> =
                sqlx::query_scalar("SELECT id FROM segments WHERE video_id = $1")
                    .bind(video_id)
                    .fetch_all(&mut *tx)
                    .await?;

            sqlx::query("DELETE FROM captions WHERE segment_id = ANY($1)")
                .bind(&old_ids)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM regions WHERE segment_id = ANY($1)")
                .bind(&old_ids)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM segments WHERE id = ANY($1)")
                .bind(&old_ids)
                .execute(&mut *tx)
                .await?;
        }

        let base_index: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_index) + 1, 0) FROM segments WHERE video_id = $1",
        )
        .bind(video_id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO segments
                (video_id, name, start_time, end_time, sequence_index, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SEGMENT_COLUMNS}"
        );

        let mut created = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            let index = base_index + i as i32;
            let name = match &input.name {
                Some(name) => name.clone(),
                None => format!("Segment {}", index + 1),
            };
            let segment = sqlx::query_as::<_, Segment>(&query)
                .bind(video_id)
                .bind(&name)
                .bind(input.start_time)
                .bind(input.end_time)
                .bind(index)
                .bind(input.created_by)
                .fetch_one(&mut *tx)
                .await?;
            created.push(segment);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Find a segment by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!("SELECT {SEGMENT_COLUMNS} FROM segments WHERE id = $1");
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a video's segments with region/caption counts, in display
    /// order.
    pub async fn list_for_video(
        pool: &PgPool,
        video_id: DbId,
    ) -> Result<Vec<SegmentSummary>, sqlx::Error> {
        sqlx::query_as::<_, SegmentSummary>(
            "SELECT
                s.id, s.video_id, s.name, s.start_time, s.end_time, s.sequence_index,
                (SELECT COUNT(*) FROM regions r WHERE r.segment_id = s.id) AS regions_count,
                (SELECT COUNT(*) FROM captions c WHERE c.segment_id = s.id) AS captions_count,
                s.created_at
             FROM segments s
             WHERE s.video_id = $1
             ORDER BY s.sequence_index ASC",
        )
        .bind(video_id)
        .fetch_all(pool)
        .await
    }

    /// Apply a partial update, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSegment,
    ) -> Result<Option<Segment>, sqlx::Error> {
        let query = format!(
            "UPDATE segments SET
                name = COALESCE($2, name),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                sequence_index = COALESCE($5, sequence_index),
                updated_at = now()
             WHERE id = $1
             RETURNING {SEGMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Segment>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.sequence_index)
            .fetch_optional(pool)
            .await
    }

    /// Delete a segment and everything it owns: regions plus every caption
    /// referencing the segment (region-level and segment-level).
    pub async fn delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM captions WHERE segment_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM regions WHERE segment_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM segments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        tx.commit().await?;
        Ok(deleted)
    }
}
