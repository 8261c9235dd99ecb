//! Route definitions for projects and their subparts.
//!
//! ```text
//! POST   /                                    create_project
//! GET    /                                    list_projects
//! GET    /{project_id}                        get_project
//! PUT    /{project_id}                        update_project
//! DELETE /{project_id}                        delete_project (cascade)
//! POST   /{project_id}/subparts               create_subpart
//! PUT    /{project_id}/subparts/{subpart_id}  update_subpart
//! DELETE /{project_id}/subparts/{subpart_id}  delete_subpart (dereference)
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(project::create_project).get(project::list_projects))
        .route(
            "/{project_id}",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route("/{project_id}/subparts", post(project::create_subpart))
        .route(
            "/{project_id}/subparts/{subpart_id}",
            put(project::update_subpart).delete(project::delete_subpart),
        )
}
