//! Route definitions for video tags.
//!
//! ```text
//! GET    /project/{project_id}   list_project_tags
//! POST   /project/{project_id}   create_tag
//! PUT    /{tag_id}               update_tag
//! DELETE /{tag_id}               delete_tag (dereference)
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::tag;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/project/{project_id}",
            get(tag::list_project_tags).post(tag::create_tag),
        )
        .route("/{tag_id}", put(tag::update_tag).delete(tag::delete_tag))
}
