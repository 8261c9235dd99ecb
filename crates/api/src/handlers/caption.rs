//! Handlers for captions (annotation step).
//!
//! Caption mutations are annotation-content changes: the repository resets
//! an approved review state in the same transaction.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;
use vidnote_db::models::caption::{CreateCaption, UpdateCaption};
use vidnote_db::repositories::CaptionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/annotations/segment/{segment_id}
///
/// All captions of a segment, region-level and segment-level.
pub async fn get_segment_captions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(segment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let captions = CaptionRepo::list_for_segment(&state.pool, segment_id).await?;
    Ok(Json(DataResponse { data: captions }))
}

/// GET /api/v1/annotations/segment-caption/{segment_id}
///
/// The segment-level caption (no region link), or null.
pub async fn get_segment_caption(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(segment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let caption = CaptionRepo::find_segment_level(&state.pool, segment_id).await?;
    Ok(Json(DataResponse { data: caption }))
}

/// GET /api/v1/annotations/region/{region_id}
///
/// The caption attached to a region, or null.
pub async fn get_region_caption(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(region_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let caption = CaptionRepo::find_for_region(&state.pool, region_id).await?;
    Ok(Json(DataResponse { data: caption }))
}

/// POST /api/v1/annotations
///
/// Create a caption, or update the existing one for the same target
/// (region, or segment-level when `region_id` is absent).
pub async fn create_caption(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateCaption>,
) -> AppResult<impl IntoResponse> {
    input.created_by = auth.user_id;

    let caption = CaptionRepo::create_or_update(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        segment_id = input.segment_id,
        region_id = ?input.region_id,
        caption_id = caption.id,
        "Caption saved"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: caption })))
}

/// PUT /api/v1/annotations/{caption_id}
pub async fn update_caption(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(caption_id): Path<DbId>,
    Json(input): Json<UpdateCaption>,
) -> AppResult<impl IntoResponse> {
    let caption = CaptionRepo::update(&state.pool, caption_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Caption",
                id: caption_id,
            })
        })?;

    Ok(Json(DataResponse { data: caption }))
}

/// DELETE /api/v1/annotations/{caption_id}
pub async fn delete_caption(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(caption_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = CaptionRepo::delete(&state.pool, caption_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Caption",
            id: caption_id,
        }));
    }

    tracing::info!(user_id = auth.user_id, caption_id, "Caption deleted");
    Ok(StatusCode::NO_CONTENT)
}
