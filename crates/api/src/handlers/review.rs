//! Handlers for the review consensus workflow.
//!
//! The consensus itself is computed in `vidnote_core::review` and persisted
//! by `ReviewRepo` inside per-video transactions; these handlers only
//! validate input and shape responses.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use vidnote_core::review::{validate_review_comment, ReviewAction};
use vidnote_core::types::DbId;
use vidnote_db::models::review::{CastVoteRequest, ReviewState, RevokeApprovalRequest};
use vidnote_db::repositories::ReviewRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for operations that only change the derived status.
#[derive(Debug, Serialize)]
pub struct ReviewStatusResponse {
    pub review_status: String,
}

/// POST /api/v1/videos/{video_id}/submit-review
///
/// Annotator submits a video for cross-check review. Allowed from any
/// state; discards all prior votes.
pub async fn submit_for_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let status = ReviewRepo::submit_for_review(&state.pool, video_id).await?;

    tracing::info!(user_id = auth.user_id, video_id, "Submitted for review");
    Ok(Json(DataResponse {
        data: ReviewStatusResponse {
            review_status: status.as_str().to_string(),
        },
    }))
}

/// POST /api/v1/videos/{video_id}/review
///
/// Cast (or overwrite) the authenticated reviewer's vote. The returned
/// status is the recomputed consensus over all current votes and the
/// subpart's required-reviewer set.
pub async fn cast_vote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
    Json(input): Json<CastVoteRequest>,
) -> AppResult<impl IntoResponse> {
    let action = ReviewAction::parse(&input.action)?;
    let comment = input.comment.unwrap_or_default();
    validate_review_comment(&comment)?;

    let (status, reviews) =
        ReviewRepo::cast_vote(&state.pool, video_id, auth.user_id, action, &comment).await?;

    Ok(Json(DataResponse {
        data: ReviewState {
            review_status: status.as_str().to_string(),
            reviews,
        },
    }))
}

/// DELETE /api/v1/videos/{video_id}/review
///
/// Withdraw the authenticated reviewer's vote (no-op when none exists) and
/// recompute the consensus.
pub async fn withdraw_vote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (status, reviews) = ReviewRepo::withdraw_vote(&state.pool, video_id, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: ReviewState {
            review_status: status.as_str().to_string(),
            reviews,
        },
    }))
}

/// POST /api/v1/videos/{video_id}/revoke-approval
///
/// Unconditionally reset the video's review state with a human-supplied
/// reason, discarding all votes.
pub async fn revoke_approval(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
    Json(input): Json<RevokeApprovalRequest>,
) -> AppResult<impl IntoResponse> {
    validate_review_comment(&input.reason)?;

    let status = ReviewRepo::revoke_approval(&state.pool, video_id, &input.reason).await?;

    tracing::info!(user_id = auth.user_id, video_id, "Approval revoked");
    Ok(Json(DataResponse {
        data: ReviewStatusResponse {
            review_status: status.as_str().to_string(),
        },
    }))
}
