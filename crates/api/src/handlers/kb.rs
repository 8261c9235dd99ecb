//! Handlers for the knowledge-base concept forest.
//!
//! The caption-generation collaborator calls the context endpoint and
//! receives plain text; everything else serves the KB editor UI.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use vidnote_core::annotation::validate_required_name;
use vidnote_core::types::DbId;
use vidnote_db::models::kb_node::{
    assemble_context, build_tree, ContextLanguage, CreateKbNode, KbContext, KbContextRequest,
    KbNode, UpdateKbNode,
};
use vidnote_db::repositories::KbRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /api/v1/kb`.
#[derive(Debug, Deserialize)]
pub struct KbListParams {
    /// Return the forest as nested trees instead of a flat list.
    #[serde(default)]
    pub tree: bool,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
}

/// Query parameters for `DELETE /api/v1/kb/{node_id}`.
#[derive(Debug, Deserialize)]
pub struct KbDeleteParams {
    /// Delete the whole subtree instead of reparenting the children.
    #[serde(default)]
    pub recursive: bool,
}

/// Ancestor chain response for a single node.
#[derive(Debug, Serialize)]
pub struct KbAncestors {
    pub ancestors: Vec<KbNode>,
}

/// GET /api/v1/kb
///
/// All KB nodes, flat (alphabetical) or as a multi-root forest with
/// `?tree=true`. Search and type filters apply to the flat form.
pub async fn list_kb_nodes(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<KbListParams>,
) -> AppResult<impl IntoResponse> {
    let search = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let node_type = params
        .node_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let nodes = KbRepo::list(&state.pool, search, node_type).await?;

    if params.tree && search.is_none() {
        let forest = build_tree(&nodes, None);
        return Ok(Json(DataResponse {
            data: serde_json::to_value(forest)
                .map_err(|e| AppError::InternalError(e.to_string()))?,
        }));
    }

    Ok(Json(DataResponse {
        data: serde_json::to_value(nodes).map_err(|e| AppError::InternalError(e.to_string()))?,
    }))
}

/// GET /api/v1/kb/{node_id}
///
/// Look up a node by database id, falling back to slug lookup.
pub async fn get_kb_node(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let node = match node_id.parse::<DbId>() {
        Ok(id) => KbRepo::find_by_id(&state.pool, id).await?,
        Err(_) => KbRepo::find_by_kb_id(&state.pool, &node_id).await?,
    };
    let node = node.ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    Ok(Json(DataResponse { data: node }))
}

/// GET /api/v1/kb/{node_id}/ancestors
///
/// The node's ancestor chain, root first, excluding the node itself.
pub async fn get_kb_ancestors(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(node_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ancestors = KbRepo::ancestors(&state.pool, node_id).await?;
    Ok(Json(DataResponse {
        data: KbAncestors { ancestors },
    }))
}

/// POST /api/v1/kb
pub async fn create_kb_node(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateKbNode>,
) -> AppResult<impl IntoResponse> {
    validate_required_name(&input.name, "KB node")?;

    let node = KbRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = auth.user_id, node_id = node.id, kb_id = %node.kb_id, "KB node created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: node })))
}

/// POST /api/v1/kb/quick
///
/// Quick-create a root node with minimal data (no parent, no cross-links).
pub async fn quick_create_kb_node(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateKbNode>,
) -> AppResult<impl IntoResponse> {
    validate_required_name(&input.name, "KB node")?;
    input.parent_id = None;
    input.related_kb_ids.clear();

    let node = KbRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = auth.user_id, node_id = node.id, kb_id = %node.kb_id, "KB node quick-created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: node })))
}

/// PUT /api/v1/kb/{node_id}
///
/// Field updates plus reparenting. Moving a node under its own subtree is
/// rejected.
pub async fn update_kb_node(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(node_id): Path<DbId>,
    Json(input): Json<UpdateKbNode>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_required_name(name, "KB node")?;
    }

    let node = KbRepo::update(&state.pool, node_id, &input).await?;
    Ok(Json(DataResponse { data: node }))
}

/// DELETE /api/v1/kb/{node_id}?recursive=true
///
/// `recursive=false` (default) reparents the children to the deleted
/// node's former parent; `recursive=true` removes the whole subtree.
pub async fn delete_kb_node(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(node_id): Path<DbId>,
    Query(params): Query<KbDeleteParams>,
) -> AppResult<impl IntoResponse> {
    let outcome = KbRepo::delete(&state.pool, node_id, params.recursive).await?;

    tracing::info!(
        user_id = auth.user_id,
        node_id,
        recursive = params.recursive,
        "KB node deleted"
    );
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/kb/types
///
/// The available node types with UI metadata.
pub async fn get_kb_types(_auth: AuthUser) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: json!([
            {"value": "action", "label": "Action", "icon": "directions_run", "color": "#10b981"},
            {"value": "object", "label": "Object", "icon": "category", "color": "#3b82f6"},
            {"value": "concept", "label": "Concept", "icon": "lightbulb", "color": "#f59e0b"},
            {"value": "ritual", "label": "Ritual", "icon": "auto_awesome", "color": "#8b5cf6"},
            {"value": "festival", "label": "Festival", "icon": "celebration", "color": "#ec4899"}
        ]),
    }))
}

/// POST /api/v1/kb/context
///
/// Assemble the caption-generation context for a set of nodes: per node,
/// the ancestor descriptions root-first plus the node's own description
/// and visual cues, one line per node. Missing ids are skipped.
pub async fn kb_context(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<KbContextRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(language) = &input.language {
        // Only validated here; both language blobs are always returned.
        ContextLanguage::parse(language)?;
    }

    let entries = KbRepo::context_entries(&state.pool, &input.node_ids).await?;

    Ok(Json(DataResponse {
        data: KbContext {
            context_text: assemble_context(&entries, ContextLanguage::En),
            context_text_vi: assemble_context(&entries, ContextLanguage::Vi),
        },
    }))
}
