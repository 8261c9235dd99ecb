//! Handlers for object regions (segmentation step).
//!
//! Region mutations are annotation-content changes: the repository resets
//! an approved review state in the same transaction.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use vidnote_core::annotation::{validate_hex_color, validate_label};
use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;
use vidnote_db::models::region::{CreateRegion, UpdateRegion};
use vidnote_db::repositories::RegionRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::segment::ensure_segment_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/segments/{segment_id}/regions
pub async fn list_segment_regions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(segment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_segment_exists(&state.pool, segment_id).await?;
    let regions = RegionRepo::list_for_segment(&state.pool, segment_id).await?;
    Ok(Json(DataResponse { data: regions }))
}

/// POST /api/v1/segments/{segment_id}/regions
///
/// Draw a new object region inside a segment.
pub async fn create_region(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(segment_id): Path<DbId>,
    Json(mut input): Json<CreateRegion>,
) -> AppResult<impl IntoResponse> {
    if let Some(label) = &input.label {
        validate_label(label)?;
    }
    if let Some(color) = &input.color {
        validate_hex_color(color)?;
    }
    input.created_by = auth.user_id;

    let region = RegionRepo::create(&state.pool, segment_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        segment_id,
        region_id = region.id,
        "Region created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: region })))
}

/// PUT /api/v1/segments/regions/{region_id}
pub async fn update_region(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(region_id): Path<DbId>,
    Json(input): Json<UpdateRegion>,
) -> AppResult<impl IntoResponse> {
    if let Some(label) = &input.label {
        validate_label(label)?;
    }
    if let Some(color) = &input.color {
        validate_hex_color(color)?;
    }

    let region = RegionRepo::update(&state.pool, region_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Region",
                id: region_id,
            })
        })?;

    Ok(Json(DataResponse { data: region }))
}

/// DELETE /api/v1/segments/regions/{region_id}
///
/// Cascade delete: removes the caption referencing the region.
pub async fn delete_region(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(region_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = RegionRepo::delete_cascade(&state.pool, region_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Region",
            id: region_id,
        }));
    }

    tracing::info!(user_id = auth.user_id, region_id, "Region deleted");
    Ok(StatusCode::NO_CONTENT)
}
