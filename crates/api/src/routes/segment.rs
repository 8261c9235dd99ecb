//! Route definitions for segments and their object regions.
//!
//! ```text
//! GET    /video/{video_id}          list_video_segments
//! POST   /video/{video_id}          create_segment
//! POST   /video/{video_id}/batch    create_segments_batch
//! PUT    /{segment_id}              update_segment
//! DELETE /{segment_id}              delete_segment (cascade)
//! GET    /{segment_id}/regions      list_segment_regions
//! POST   /{segment_id}/regions      create_region
//! PUT    /regions/{region_id}       update_region
//! DELETE /regions/{region_id}       delete_region (cascade)
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{region, segment};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/video/{video_id}",
            get(segment::list_video_segments).post(segment::create_segment),
        )
        .route("/video/{video_id}/batch", post(segment::create_segments_batch))
        .route(
            "/{segment_id}",
            put(segment::update_segment).delete(segment::delete_segment),
        )
        .route(
            "/{segment_id}/regions",
            get(region::list_segment_regions).post(region::create_region),
        )
        .route(
            "/regions/{region_id}",
            put(region::update_region).delete(region::delete_region),
        )
}
