//! Repository for the multi-reviewer sign-off workflow.
//!
//! Every operation here is one transaction with a `FOR UPDATE` lock on the
//! video row, so concurrent votes on the same video serialize and the
//! stored `review_status` can never drift from the vote set it was
//! computed from. Vote writes are targeted per reviewer (upsert on the
//! `(video_id, reviewer_id)` constraint), never a whole-set replace.

use sqlx::{PgConnection, PgPool};
use vidnote_core::error::CoreError;
use vidnote_core::review::{
    compute_review_status, ReviewAction, ReviewStatus, ReviewVote, AUTO_RESET_COMMENT,
};
use vidnote_core::types::DbId;

use crate::error::DbError;
use crate::models::review::VideoReview;

/// Column list for video_reviews queries.
const REVIEW_COLUMNS: &str = "id, video_id, reviewer_id, action, comment, decided_at";

/// Provides the review-workflow operations for videos.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Lock the video row for the duration of the transaction, returning
    /// its subpart link. Errors with NotFound when the video is absent.
    async fn lock_video(conn: &mut PgConnection, video_id: DbId) -> Result<Option<DbId>, DbError> {
        let row: Option<(DbId, Option<DbId>)> =
            sqlx::query_as("SELECT id, subpart_id FROM videos WHERE id = $1 FOR UPDATE")
                .bind(video_id)
                .fetch_optional(conn)
                .await?;

        match row {
            Some((_, subpart_id)) => Ok(subpart_id),
            None => Err(DbError::not_found("Video", video_id)),
        }
    }

    /// The required-reviewer set for a video: its subpart's `reviewer_ids`,
    /// or empty when the video has no subpart (any reviewer suffices).
    async fn required_reviewers(
        conn: &mut PgConnection,
        subpart_id: Option<DbId>,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let Some(subpart_id) = subpart_id else {
            return Ok(Vec::new());
        };
        let reviewers: Option<Vec<DbId>> =
            sqlx::query_scalar("SELECT reviewer_ids FROM subparts WHERE id = $1")
                .bind(subpart_id)
                .fetch_optional(conn)
                .await?;
        Ok(reviewers.unwrap_or_default())
    }

    /// Load a video's votes in decision order (a re-vote moves to the end).
    async fn load_votes(
        conn: &mut PgConnection,
        video_id: DbId,
    ) -> Result<Vec<VideoReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM video_reviews
             WHERE video_id = $1
             ORDER BY decided_at ASC, id ASC"
        );
        sqlx::query_as::<_, VideoReview>(&query)
            .bind(video_id)
            .fetch_all(conn)
            .await
    }

    fn to_vote_set(reviews: &[VideoReview]) -> Result<Vec<ReviewVote>, CoreError> {
        reviews
            .iter()
            .map(|r| {
                Ok(ReviewVote {
                    reviewer_id: r.reviewer_id,
                    action: ReviewAction::parse(&r.action)?,
                })
            })
            .collect()
    }

    /// Submit a video for cross-check review. Allowed from any state;
    /// irrevocably discards all prior votes.
    pub async fn submit_for_review(pool: &PgPool, video_id: DbId) -> Result<ReviewStatus, DbError> {
        let mut tx = pool.begin().await?;
        Self::lock_video(&mut tx, video_id).await?;

        sqlx::query("DELETE FROM video_reviews WHERE video_id = $1")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE videos SET
                review_status = $2, review_comment = '', reviewed_by = NULL,
                reviewed_at = NULL, updated_at = now()
             WHERE id = $1",
        )
        .bind(video_id)
        .bind(ReviewStatus::PendingReview.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(video_id, "Video submitted for review");
        Ok(ReviewStatus::PendingReview)
    }

    /// Cast (or overwrite) one reviewer's vote and recompute the consensus
    /// status. Idempotent per reviewer: a re-vote replaces, never
    /// duplicates.
    pub async fn cast_vote(
        pool: &PgPool,
        video_id: DbId,
        reviewer_id: DbId,
        action: ReviewAction,
        comment: &str,
    ) -> Result<(ReviewStatus, Vec<VideoReview>), DbError> {
        let mut tx = pool.begin().await?;
        let subpart_id = Self::lock_video(&mut tx, video_id).await?;

        sqlx::query(
            "INSERT INTO video_reviews (video_id, reviewer_id, action, comment)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_video_reviews_video_reviewer
             DO UPDATE SET action = EXCLUDED.action, comment = EXCLUDED.comment,
                           decided_at = now()",
        )
        .bind(video_id)
        .bind(reviewer_id)
        .bind(action.as_str())
        .bind(comment)
        .execute(&mut *tx)
        .await?;

        let reviews = Self::load_votes(&mut tx, video_id).await?;
        let votes = Self::to_vote_set(&reviews)?;
        let required = Self::required_reviewers(&mut tx, subpart_id).await?;
        let status = compute_review_status(&votes, &required);

        sqlx::query(
            "UPDATE videos SET
                review_status = $2, review_comment = $3, reviewed_by = $4,
                reviewed_at = now(), updated_at = now()
             WHERE id = $1",
        )
        .bind(video_id)
        .bind(status.as_str())
        .bind(comment)
        .bind(reviewer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            video_id,
            reviewer_id,
            action = action.as_str(),
            status = status.as_str(),
            "Review vote cast"
        );
        Ok((status, reviews))
    }

    /// Withdraw one reviewer's vote (no-op when none exists) and recompute
    /// the consensus status.
    pub async fn withdraw_vote(
        pool: &PgPool,
        video_id: DbId,
        reviewer_id: DbId,
    ) -> Result<(ReviewStatus, Vec<VideoReview>), DbError> {
        let mut tx = pool.begin().await?;
        let subpart_id = Self::lock_video(&mut tx, video_id).await?;

        sqlx::query("DELETE FROM video_reviews WHERE video_id = $1 AND reviewer_id = $2")
            .bind(video_id)
            .bind(reviewer_id)
            .execute(&mut *tx)
            .await?;

        let reviews = Self::load_votes(&mut tx, video_id).await?;
        let votes = Self::to_vote_set(&reviews)?;
        let required = Self::required_reviewers(&mut tx, subpart_id).await?;
        let status = compute_review_status(&votes, &required);

        sqlx::query("UPDATE videos SET review_status = $2, updated_at = now() WHERE id = $1")
            .bind(video_id)
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            video_id,
            reviewer_id,
            status = status.as_str(),
            "Review vote withdrawn"
        );
        Ok((status, reviews))
    }

    /// Unconditionally revoke a video's review state with a caller-supplied
    /// reason, discarding all votes.
    pub async fn revoke_approval(
        pool: &PgPool,
        video_id: DbId,
        reason: &str,
    ) -> Result<ReviewStatus, DbError> {
        let mut tx = pool.begin().await?;
        Self::lock_video(&mut tx, video_id).await?;

        sqlx::query("DELETE FROM video_reviews WHERE video_id = $1")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE videos SET
                review_status = $2, review_comment = $3, reviewed_by = NULL,
                updated_at = now()
             WHERE id = $1",
        )
        .bind(video_id)
        .bind(ReviewStatus::NotSubmitted.as_str())
        .bind(reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(video_id, reason, "Video approval revoked");
        Ok(ReviewStatus::NotSubmitted)
    }

    /// Content-change watcher: reset an `approved` video back to
    /// `not_submitted` with a machine-generated comment, discarding votes.
    ///
    /// Must run on the same connection (inside the same transaction) as
    /// the content mutation that triggered it. The conditional WHERE makes
    /// it a no-op for every other status and closes the race against a
    /// concurrent approval. Returns whether a reset happened.
    pub async fn reset_approval_on_content_change(
        conn: &mut PgConnection,
        video_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let reset = sqlx::query(
            "UPDATE videos SET
                review_status = $2, review_comment = $3, reviewed_by = NULL,
                updated_at = now()
             WHERE id = $1 AND review_status = $4",
        )
        .bind(video_id)
        .bind(ReviewStatus::NotSubmitted.as_str())
        .bind(AUTO_RESET_COMMENT)
        .bind(ReviewStatus::Approved.as_str())
        .execute(&mut *conn)
        .await?
        .rows_affected()
            > 0;

        if reset {
            sqlx::query("DELETE FROM video_reviews WHERE video_id = $1")
                .bind(video_id)
                .execute(conn)
                .await?;
            tracing::info!(video_id, "Approval reset: content modified after approval");
        }

        Ok(reset)
    }

    /// List a video's current votes in decision order.
    pub async fn list_votes(pool: &PgPool, video_id: DbId) -> Result<Vec<VideoReview>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM video_reviews
             WHERE video_id = $1
             ORDER BY decided_at ASC, id ASC"
        );
        sqlx::query_as::<_, VideoReview>(&query)
            .bind(video_id)
            .fetch_all(pool)
            .await
    }
}
