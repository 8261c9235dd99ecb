//! Handlers for video segments (cut & split step).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use vidnote_core::annotation::validate_time_range;
use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;
use vidnote_db::models::segment::{
    BatchSegmentsRequest, CreateSegment, Segment, UpdateSegment,
};
use vidnote_db::repositories::SegmentRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::video::ensure_video_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Look up a segment or fail with 404.
pub(crate) async fn ensure_segment_exists(
    pool: &vidnote_db::DbPool,
    segment_id: DbId,
) -> AppResult<Segment> {
    SegmentRepo::find_by_id(pool, segment_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Segment",
                id: segment_id,
            })
        })
}

/// GET /api/v1/segments/video/{video_id}
///
/// List a video's segments with region/caption counts, in display order.
pub async fn list_video_segments(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let segments = SegmentRepo::list_for_video(&state.pool, video_id).await?;
    Ok(Json(DataResponse { data: segments }))
}

/// POST /api/v1/segments/video/{video_id}
///
/// Cut a new segment out of a video.
pub async fn create_segment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
    Json(mut input): Json<CreateSegment>,
) -> AppResult<impl IntoResponse> {
    validate_time_range(input.start_time, input.end_time)?;
    ensure_video_exists(&state.pool, video_id).await?;
    input.created_by = auth.user_id;

    let segment = SegmentRepo::create(&state.pool, video_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        video_id,
        segment_id = segment.id,
        "Segment created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: segment })))
}

/// POST /api/v1/segments/video/{video_id}/batch
///
/// Create multiple segments at once (auto-split). With `replace = true`
/// the existing segments are cascaded away first. All time ranges are
/// validated before anything is written.
pub async fn create_segments_batch(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
    Json(mut input): Json<BatchSegmentsRequest>,
) -> AppResult<impl IntoResponse> {
    if input.segments.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No segments provided".to_string(),
        )));
    }
    for segment in &input.segments {
        validate_time_range(segment.start_time, segment.end_time)?;
    }
    ensure_video_exists(&state.pool, video_id).await?;
    for segment in &mut input.segments {
        segment.created_by = auth.user_id;
    }

    let created =
        SegmentRepo::create_batch(&state.pool, video_id, &input.segments, input.replace).await?;

    tracing::info!(
        user_id = auth.user_id,
        video_id,
        count = created.len(),
        replace = input.replace,
        "Segments batch created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PUT /api/v1/segments/{segment_id}
pub async fn update_segment(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(segment_id): Path<DbId>,
    Json(input): Json<UpdateSegment>,
) -> AppResult<impl IntoResponse> {
    if let (Some(start), Some(end)) = (input.start_time, input.end_time) {
        validate_time_range(start, end)?;
    }

    let segment = SegmentRepo::update(&state.pool, segment_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Segment",
                id: segment_id,
            })
        })?;

    Ok(Json(DataResponse { data: segment }))
}

/// DELETE /api/v1/segments/{segment_id}
///
/// Cascade delete: removes the segment's regions and every caption
/// referencing it (region-level and segment-level).
pub async fn delete_segment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(segment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = SegmentRepo::delete_cascade(&state.pool, segment_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Segment",
            id: segment_id,
        }));
    }

    tracing::info!(user_id = auth.user_id, segment_id, "Segment deleted");
    Ok(StatusCode::NO_CONTENT)
}
