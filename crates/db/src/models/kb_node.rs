//! Knowledge-base node model, DTOs, and the pure tree/context assembly
//! functions.
//!
//! `build_tree` and `assemble_context` operate on already-loaded rows so
//! they can be unit-tested without a database; `KbRepo` does the loading.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vidnote_core::error::CoreError;
use vidnote_core::types::{DbId, Timestamp};

/// A row from the `kb_nodes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KbNode {
    pub id: DbId,
    /// Human-readable slug, unique across the forest.
    pub kb_id: String,
    pub name: String,
    pub name_vi: String,
    pub node_type: String,
    pub parent_id: Option<DbId>,
    pub children_ids: Vec<DbId>,
    pub description: String,
    pub description_vi: String,
    pub visual_cues: String,
    pub visual_cues_vi: String,
    pub related_kb_ids: Vec<DbId>,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A node with its children attached, produced by [`build_tree`].
#[derive(Debug, Clone, Serialize)]
pub struct KbTreeNode {
    #[serde(flatten)]
    pub node: KbNode,
    pub children: Vec<KbTreeNode>,
}

/// DTO for creating a new KB node. The slug is derived from `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKbNode {
    pub name: String,
    #[serde(default)]
    pub name_vi: Option<String>,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub parent_id: Option<DbId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_vi: Option<String>,
    #[serde(default)]
    pub visual_cues: Option<String>,
    #[serde(default)]
    pub visual_cues_vi: Option<String>,
    #[serde(default)]
    pub related_kb_ids: Vec<DbId>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for updating an existing KB node.
///
/// `parent_id` uses a double option: JSON `null` moves the node to the
/// root, an absent field leaves the parent untouched. A name change
/// re-derives the slug.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateKbNode {
    pub name: Option<String>,
    pub name_vi: Option<String>,
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub parent_id: Option<Option<DbId>>,
    pub description: Option<String>,
    pub description_vi: Option<String>,
    pub visual_cues: Option<String>,
    pub visual_cues_vi: Option<String>,
    pub related_kb_ids: Option<Vec<DbId>>,
    pub tags: Option<Vec<String>>,
}

/// Result of a KB node deletion.
#[derive(Debug, Clone, Serialize)]
pub struct KbDeleteOutcome {
    /// Ids removed from the forest (the node, plus its subtree when the
    /// delete was recursive).
    pub removed_ids: Vec<DbId>,
    /// Direct children moved up to the deleted node's former parent
    /// (empty for recursive deletes).
    pub reparented_ids: Vec<DbId>,
}

/// Request body for the context-assembly endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct KbContextRequest {
    #[serde(default)]
    pub node_ids: Vec<DbId>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Assembled context returned to the caption-generation collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct KbContext {
    pub context_text: String,
    pub context_text_vi: String,
}

/* --------------------------------------------------------------------------
Language selection
-------------------------------------------------------------------------- */

/// Caption context language. Vietnamese fields fall back to the English
/// ones when empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextLanguage {
    En,
    Vi,
}

impl ContextLanguage {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "en" => Ok(ContextLanguage::En),
            "vi" => Ok(ContextLanguage::Vi),
            other => Err(CoreError::Validation(format!(
                "Invalid language '{other}'. Must be en or vi"
            ))),
        }
    }
}

impl KbNode {
    fn display_name(&self, language: ContextLanguage) -> &str {
        match language {
            ContextLanguage::En => &self.name,
            ContextLanguage::Vi if self.name_vi.is_empty() => &self.name,
            ContextLanguage::Vi => &self.name_vi,
        }
    }

    fn display_description(&self, language: ContextLanguage) -> &str {
        match language {
            ContextLanguage::En => &self.description,
            ContextLanguage::Vi if self.description_vi.is_empty() => &self.description,
            ContextLanguage::Vi => &self.description_vi,
        }
    }

    fn display_visual_cues(&self, language: ContextLanguage) -> &str {
        match language {
            ContextLanguage::En => &self.visual_cues,
            ContextLanguage::Vi if self.visual_cues_vi.is_empty() => &self.visual_cues,
            ContextLanguage::Vi => &self.visual_cues_vi,
        }
    }
}

/* --------------------------------------------------------------------------
Tree assembly
-------------------------------------------------------------------------- */

/// Build a hierarchical forest from a flat node list by partitioning on
/// `parent_id` and recursively attaching children. `parent_id = None`
/// yields all roots.
pub fn build_tree(nodes: &[KbNode], parent_id: Option<DbId>) -> Vec<KbTreeNode> {
    nodes
        .iter()
        .filter(|n| n.parent_id == parent_id)
        .map(|n| KbTreeNode {
            children: build_tree(nodes, Some(n.id)),
            node: n.clone(),
        })
        .collect()
}

/* --------------------------------------------------------------------------
Context assembly
-------------------------------------------------------------------------- */

/// Render one node's context chain: each ancestor's "name: description"
/// root-first, then the node's own name, description and visual cues.
pub fn context_chain(ancestors: &[KbNode], node: &KbNode, language: ContextLanguage) -> String {
    let cue_label = match language {
        ContextLanguage::En => "Visual cues",
        ContextLanguage::Vi => "Đặc điểm nhận dạng",
    };

    let mut parts = Vec::new();
    for ancestor in ancestors {
        let description = ancestor.display_description(language);
        if !description.is_empty() {
            parts.push(format!("{}: {description}", ancestor.display_name(language)));
        }
    }

    let mut own = node.display_name(language).to_string();
    let description = node.display_description(language);
    if !description.is_empty() {
        own.push_str(&format!(": {description}"));
    }
    let cues = node.display_visual_cues(language);
    if !cues.is_empty() {
        own.push_str(&format!(" ({cue_label}: {cues})"));
    }
    parts.push(own);

    parts.join(" → ")
}

/// Join the context chains of several nodes (each paired with its ancestor
/// chain, root-first) into one text blob, one line per node.
pub fn assemble_context(entries: &[(Vec<KbNode>, KbNode)], language: ContextLanguage) -> String {
    entries
        .iter()
        .map(|(ancestors, node)| context_chain(ancestors, node, language))
        .collect::<Vec<_>>()
        .join("\n")
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
