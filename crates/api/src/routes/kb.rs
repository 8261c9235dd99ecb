//! Route definitions for the knowledge base.
//!
//! ```text
//! GET    /                        list_kb_nodes (?tree=true, ?search=, ?type=)
//! POST   /                        create_kb_node
//! GET    /types                   get_kb_types
//! POST   /quick                   quick_create_kb_node
//! POST   /context                 kb_context
//! GET    /{node_id}               get_kb_node (id or slug)
//! PUT    /{node_id}               update_kb_node
//! DELETE /{node_id}               delete_kb_node (?recursive=true)
//! GET    /{node_id}/ancestors     get_kb_ancestors
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::kb;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(kb::list_kb_nodes).post(kb::create_kb_node))
        .route("/types", get(kb::get_kb_types))
        .route("/quick", post(kb::quick_create_kb_node))
        .route("/context", post(kb::kb_context))
        .route(
            "/{node_id}",
            get(kb::get_kb_node)
                .put(kb::update_kb_node)
                .delete(kb::delete_kb_node),
        )
        .route("/{node_id}/ancestors", get(kb::get_kb_ancestors))
}
