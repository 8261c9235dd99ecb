//! Handlers for video registration, metadata and deletion.
//!
//! Binary upload and storage live in the external upload service; these
//! endpoints manage the metadata rows. Content-bearing updates (duration,
//! dimensions, processing step, status) reset an approved review state via
//! the repository-level watcher.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;
use vidnote_db::models::segment::SegmentSummary;
use vidnote_db::models::video::{CreateVideo, UpdateVideo, Video};
use vidnote_db::repositories::{SegmentRepo, VideoRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::project::ensure_project_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Video detail: the video row plus its segments in display order.
#[derive(Debug, Serialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: Video,
    pub segments: Vec<SegmentSummary>,
}

/// Look up a video or fail with 404.
pub(crate) async fn ensure_video_exists(
    pool: &vidnote_db::DbPool,
    video_id: DbId,
) -> AppResult<Video> {
    VideoRepo::find_by_id(pool, video_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: video_id,
        })
    })
}

/// POST /api/v1/videos
///
/// Register an uploaded video's metadata under a project.
pub async fn create_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateVideo>,
) -> AppResult<impl IntoResponse> {
    if input.filename.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Video filename is required".to_string(),
        )));
    }
    ensure_project_exists(&state.pool, input.project_id).await?;
    input.uploaded_by = auth.user_id;

    let video = VideoRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        video_id = video.id,
        project_id = video.project_id,
        "Video registered"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: video })))
}

/// GET /api/v1/videos/project/{project_id}
///
/// List a project's videos with annotation statistics.
pub async fn list_project_videos(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let videos = VideoRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: videos }))
}

/// GET /api/v1/videos/subpart/{subpart_id}
///
/// List a subpart's videos with annotation statistics.
pub async fn list_subpart_videos(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(subpart_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let videos = VideoRepo::list_for_subpart(&state.pool, subpart_id).await?;
    Ok(Json(DataResponse { data: videos }))
}

/// GET /api/v1/videos/{video_id}
///
/// Video detail including its segments in display order.
pub async fn get_video(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let video = ensure_video_exists(&state.pool, video_id).await?;
    let segments = SegmentRepo::list_for_video(&state.pool, video_id).await?;

    Ok(Json(DataResponse {
        data: VideoDetail { video, segments },
    }))
}

/// PUT /api/v1/videos/{video_id}
pub async fn update_video(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
    Json(input): Json<UpdateVideo>,
) -> AppResult<impl IntoResponse> {
    let video = VideoRepo::update(&state.pool, video_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Video",
                id: video_id,
            })
        })?;

    Ok(Json(DataResponse { data: video }))
}

/// DELETE /api/v1/videos/{video_id}
///
/// Cascade delete: removes the video's segments, regions, captions and
/// review votes.
pub async fn delete_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = VideoRepo::delete_cascade(&state.pool, video_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: video_id,
        }));
    }

    tracing::info!(user_id = auth.user_id, video_id, "Video deleted");
    Ok(StatusCode::NO_CONTENT)
}
