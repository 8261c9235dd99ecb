//! Handlers for object categories.
//!
//! Deleting a category dereferences: regions keep their rows and lose the
//! category fields. Category changes never touch review state.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use vidnote_core::annotation::{validate_hex_color, validate_required_name};
use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;
use vidnote_db::models::category::{CreateCategory, UpdateCategory};
use vidnote_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::project::ensure_project_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories/project/{project_id}
pub async fn list_project_categories(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/categories/project/{project_id}
///
/// Duplicate names within a project are rejected with 409.
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(mut input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    validate_required_name(&input.name, "Category")?;
    if let Some(color) = &input.color {
        validate_hex_color(color)?;
    }
    ensure_project_exists(&state.pool, project_id).await?;
    input.created_by = auth.user_id;

    let category = CategoryRepo::create(&state.pool, project_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        project_id,
        category_id = category.id,
        "Category created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/categories/{category_id}
pub async fn update_category(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_required_name(name, "Category")?;
    }
    if let Some(color) = &input.color {
        validate_hex_color(color)?;
    }

    let category = CategoryRepo::update(&state.pool, category_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Category",
                id: category_id,
            })
        })?;

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{category_id}
///
/// Dereference delete: regions that used the category survive with the
/// category fields cleared.
pub async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = CategoryRepo::delete(&state.pool, category_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }

    tracing::info!(user_id = auth.user_id, category_id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
