//! Route definitions for object categories.
//!
//! ```text
//! GET    /project/{project_id}   list_project_categories
//! POST   /project/{project_id}   create_category
//! PUT    /{category_id}          update_category
//! DELETE /{category_id}          delete_category (dereference)
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::category;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/project/{project_id}",
            get(category::list_project_categories).post(category::create_category),
        )
        .route(
            "/{category_id}",
            put(category::update_category).delete(category::delete_category),
        )
}
