//! Handlers for project and subpart management.
//!
//! Deleting a project cascades through its videos, segments, regions,
//! captions, subparts, categories and tags. Deleting a subpart only
//! dereferences: videos keep their rows and lose the assignment link.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use vidnote_core::annotation::validate_required_name;
use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;
use vidnote_db::models::project::{CreateProject, Project, UpdateProject};
use vidnote_db::models::subpart::{CreateSubpart, Subpart, UpdateSubpart};
use vidnote_db::models::video::VideoSummary;
use vidnote_db::repositories::{ProjectRepo, SubpartRepo, VideoRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Project detail: the project row plus its subparts and videos.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub subparts: Vec<Subpart>,
    pub videos: Vec<VideoSummary>,
}

/// Look up a project or fail with 404.
pub(crate) async fn ensure_project_exists(
    pool: &vidnote_db::DbPool,
    project_id: DbId,
) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            })
        })
}

/// POST /api/v1/projects
///
/// Create a new project owned by the authenticated user.
pub async fn create_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    validate_required_name(&input.name, "Project")?;
    input.created_by = auth.user_id;

    let project = ProjectRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = auth.user_id, project_id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
///
/// List all projects with subpart/video counts.
pub async fn list_projects(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let projects = ProjectRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{project_id}
///
/// Project detail including its subparts (newest first) and videos.
pub async fn get_project(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = ensure_project_exists(&state.pool, project_id).await?;
    let subparts = SubpartRepo::list_for_project(&state.pool, project_id).await?;
    let videos = VideoRepo::list_for_project(&state.pool, project_id).await?;

    Ok(Json(DataResponse {
        data: ProjectDetail {
            project,
            subparts,
            videos,
        },
    }))
}

/// PUT /api/v1/projects/{project_id}
pub async fn update_project(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_required_name(name, "Project")?;
    }

    let project = ProjectRepo::update(&state.pool, project_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            })
        })?;

    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{project_id}
///
/// Cascade delete: removes every video, segment, region, caption, review
/// vote, subpart, category and tag owned by the project.
pub async fn delete_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = ProjectRepo::delete_cascade(&state.pool, project_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }));
    }

    tracing::info!(user_id = auth.user_id, project_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{project_id}/subparts
pub async fn create_subpart(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateSubpart>,
) -> AppResult<impl IntoResponse> {
    validate_required_name(&input.name, "Subpart")?;
    ensure_project_exists(&state.pool, project_id).await?;

    let subpart = SubpartRepo::create(&state.pool, project_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        project_id,
        subpart_id = subpart.id,
        reviewers = subpart.reviewer_ids.len(),
        "Subpart created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: subpart })))
}

/// PUT /api/v1/projects/{project_id}/subparts/{subpart_id}
pub async fn update_subpart(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, subpart_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSubpart>,
) -> AppResult<impl IntoResponse> {
    let subpart = SubpartRepo::update(&state.pool, project_id, subpart_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Subpart",
                id: subpart_id,
            })
        })?;

    Ok(Json(DataResponse { data: subpart }))
}

/// DELETE /api/v1/projects/{project_id}/subparts/{subpart_id}
///
/// Dereference delete: videos that referenced the subpart survive with the
/// link cleared.
pub async fn delete_subpart(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, subpart_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let deleted = SubpartRepo::delete(&state.pool, project_id, subpart_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Subpart",
            id: subpart_id,
        }));
    }

    tracing::info!(user_id = auth.user_id, project_id, subpart_id, "Subpart deleted");
    Ok(StatusCode::NO_CONTENT)
}
