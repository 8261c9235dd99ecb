//! Route definitions for captions.
//!
//! ```text
//! POST   /                                 create_caption (create-or-update)
//! GET    /segment/{segment_id}             get_segment_captions
//! GET    /segment-caption/{segment_id}     get_segment_caption
//! GET    /region/{region_id}               get_region_caption
//! PUT    /{caption_id}                     update_caption
//! DELETE /{caption_id}                     delete_caption
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::caption;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(caption::create_caption))
        .route("/segment/{segment_id}", get(caption::get_segment_captions))
        .route(
            "/segment-caption/{segment_id}",
            get(caption::get_segment_caption),
        )
        .route("/region/{region_id}", get(caption::get_region_caption))
        .route(
            "/{caption_id}",
            put(caption::update_caption).delete(caption::delete_caption),
        )
}
