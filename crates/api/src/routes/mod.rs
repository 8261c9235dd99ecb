//! Route tree for the `/api/v1` surface.

pub mod annotation;
pub mod category;
pub mod health;
pub mod kb;
pub mod project;
pub mod segment;
pub mod tag;
pub mod video;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                 create, list
/// /projects/{id}                            get, update, cascade delete
/// /projects/{id}/subparts                   create
/// /projects/{id}/subparts/{subpart_id}      update, dereference delete
///
/// /videos                                   register metadata
/// /videos/project/{project_id}              list with stats
/// /videos/subpart/{subpart_id}              list with stats
/// /videos/{id}                              get, update, cascade delete
/// /videos/{id}/submit-review                submit for review
/// /videos/{id}/review                       cast vote (POST), withdraw (DELETE)
/// /videos/{id}/revoke-approval              revoke with reason
///
/// /segments/video/{video_id}                list, create
/// /segments/video/{video_id}/batch          batch create (auto-split)
/// /segments/{id}                            update, cascade delete
/// /segments/{id}/regions                    list, create
/// /segments/regions/{region_id}             update, cascade delete
///
/// /annotations                              create-or-update caption
/// /annotations/segment/{segment_id}         all captions of a segment
/// /annotations/segment-caption/{segment_id} segment-level caption
/// /annotations/region/{region_id}           region caption
/// /annotations/{caption_id}                 update, delete
///
/// /categories/project/{project_id}          list, create
/// /categories/{id}                          update, dereference delete
/// /tags/project/{project_id}                list, create
/// /tags/{id}                                update, dereference delete
///
/// /kb                                       list (flat or ?tree=true), create
/// /kb/types                                 node type catalogue
/// /kb/quick                                 quick create
/// /kb/context                               caption-generation context
/// /kb/{id}                                  get (id or slug), update, delete
/// /kb/{id}/ancestors                        ancestor chain
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/videos", video::router())
        .nest("/segments", segment::router())
        .nest("/annotations", annotation::router())
        .nest("/categories", category::router())
        .nest("/tags", tag::router())
        .nest("/kb", kb::router())
}
