//! Handlers for video tags.
//!
//! Deleting a tag dereferences: the id is removed from every video's tag
//! collection. Tag changes never touch review state.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use vidnote_core::annotation::{validate_hex_color, validate_required_name};
use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;
use vidnote_db::models::tag::{CreateTag, UpdateTag};
use vidnote_db::repositories::TagRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::project::ensure_project_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tags/project/{project_id}
pub async fn list_project_tags(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tags = TagRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// POST /api/v1/tags/project/{project_id}
///
/// Duplicate names within a project are rejected with 409.
pub async fn create_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTag>,
) -> AppResult<impl IntoResponse> {
    validate_required_name(&input.name, "Tag")?;
    if let Some(color) = &input.color {
        validate_hex_color(color)?;
    }
    ensure_project_exists(&state.pool, project_id).await?;

    let tag = TagRepo::create(&state.pool, project_id, &input).await?;

    tracing::info!(user_id = auth.user_id, project_id, tag_id = tag.id, "Tag created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: tag })))
}

/// PUT /api/v1/tags/{tag_id}
pub async fn update_tag(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(tag_id): Path<DbId>,
    Json(input): Json<UpdateTag>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_required_name(name, "Tag")?;
    }
    if let Some(color) = &input.color {
        validate_hex_color(color)?;
    }

    let tag = TagRepo::update(&state.pool, tag_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Tag",
                id: tag_id,
            })
        })?;

    Ok(Json(DataResponse { data: tag }))
}

/// DELETE /api/v1/tags/{tag_id}
///
/// Dereference delete: the tag id is removed from every video's tags.
pub async fn delete_tag(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(tag_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = TagRepo::delete(&state.pool, tag_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Tag",
            id: tag_id,
        }));
    }

    tracing::info!(user_id = auth.user_id, tag_id, "Tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
