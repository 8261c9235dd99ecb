//! Route definitions for videos and the review workflow.
//!
//! ```text
//! POST   /                             create_video
//! GET    /project/{project_id}         list_project_videos
//! GET    /subpart/{subpart_id}         list_subpart_videos
//! GET    /{video_id}                   get_video
//! PUT    /{video_id}                   update_video
//! DELETE /{video_id}                   delete_video (cascade)
//! POST   /{video_id}/submit-review     submit_for_review
//! POST   /{video_id}/review            cast_vote
//! DELETE /{video_id}/review            withdraw_vote
//! POST   /{video_id}/revoke-approval   revoke_approval
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{review, video};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(video::create_video))
        .route("/project/{project_id}", get(video::list_project_videos))
        .route("/subpart/{subpart_id}", get(video::list_subpart_videos))
        .route(
            "/{video_id}",
            get(video::get_video)
                .put(video::update_video)
                .delete(video::delete_video),
        )
        .route("/{video_id}/submit-review", post(review::submit_for_review))
        .route(
            "/{video_id}/review",
            post(review::cast_vote).delete(review::withdraw_vote),
        )
        .route("/{video_id}/revoke-approval", post(review::revoke_approval))
}
