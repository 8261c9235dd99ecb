//! Knowledge-base slug derivation and tree-link arithmetic.
//!
//! The KB forest is stored as rows with reciprocal `parent_id` /
//! `children_ids` links. The helpers here operate on plain id maps so the
//! repository can load the link structure once and run ancestor walks,
//! subtree collection and cycle checks in memory. Every walk carries a
//! visited-set guard: the store does not enforce acyclicity, so a corrupt
//! link must never loop an operation forever.

use std::collections::{HashMap, HashSet};

use crate::types::DbId;

/// Derive a slug id from a display name: lowercase, spaces to underscores,
/// everything outside `[a-z0-9_]` stripped.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Walk `parent_id` links upward from `node`, returning ancestor ids
/// ordered root-first. Excludes `node` itself. Stops at the first node with
/// no parent, at a parent missing from the map, or on a repeated id.
pub fn ancestor_ids(node: DbId, parent_of: &HashMap<DbId, Option<DbId>>) -> Vec<DbId> {
    let mut ancestors = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(node);

    let mut current = node;
    while let Some(Some(parent)) = parent_of.get(&current) {
        if !visited.insert(*parent) {
            break;
        }
        ancestors.push(*parent);
        current = *parent;
    }

    ancestors.reverse();
    ancestors
}

/// Whether `candidate` lies inside the subtree rooted at `root` (including
/// `root` itself), following `parent_id` links upward from `candidate`.
pub fn is_in_subtree(
    candidate: DbId,
    root: DbId,
    parent_of: &HashMap<DbId, Option<DbId>>,
) -> bool {
    candidate == root || ancestor_ids(candidate, parent_of).contains(&root)
}

/// Collect the subtree rooted at `root` in depth-first preorder, following
/// a child map derived from `parent_id` links. Includes `root`.
pub fn collect_subtree(root: DbId, children_of: &HashMap<DbId, Vec<DbId>>) -> Vec<DbId> {
    let mut collected = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        collected.push(id);
        if let Some(children) = children_of.get(&id) {
            // Reverse so the leftmost child is visited first.
            for child in children.iter().rev() {
                stack.push(*child);
            }
        }
    }

    collected
}

/// Build the id -> parent map from `(id, parent_id)` rows.
pub fn parent_map(links: &[(DbId, Option<DbId>)]) -> HashMap<DbId, Option<DbId>> {
    links.iter().copied().collect()
}

/// Build the id -> children map from `(id, parent_id)` rows, preserving row
/// order within each parent.
pub fn child_map(links: &[(DbId, Option<DbId>)]) -> HashMap<DbId, Vec<DbId>> {
    let mut children: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for (id, parent) in links {
        if let Some(parent) = parent {
            children.entry(*parent).or_default().push(*id);
        }
    }
    children
}
