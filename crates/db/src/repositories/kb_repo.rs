//! Repository for the `kb_nodes` table: the knowledge-base concept forest.
//!
//! Structural edits keep the reciprocal `parent_id` / `children_ids` links
//! consistent inside one transaction. Reparenting rejects a move into the
//! node's own subtree; ancestor walks carry a visited-set guard so a
//! corrupt link can never loop an operation forever.

use std::collections::HashSet;

use sqlx::PgPool;
use vidnote_core::error::CoreError;
use vidnote_core::kb::{child_map, collect_subtree, is_in_subtree, parent_map, slugify};
use vidnote_core::types::DbId;

use crate::error::DbError;
use crate::models::kb_node::{CreateKbNode, KbDeleteOutcome, KbNode, UpdateKbNode};

/// Column list for kb_nodes queries.
const KB_COLUMNS: &str = "id, kb_id, name, name_vi, node_type, parent_id, children_ids, \
    description, description_vi, visual_cues, visual_cues_vi, related_kb_ids, tags, \
    created_at, updated_at";

/// Provides CRUD and tree operations for KB nodes.
pub struct KbRepo;

impl KbRepo {
    /// Derive a unique slug for `name` on the given connection: on
    /// collision, append a numeric suffix based on the count of existing
    /// slugs sharing the prefix.
    async fn unique_slug(
        conn: &mut sqlx::PgConnection,
        name: &str,
    ) -> Result<String, sqlx::Error> {
        let slug = slugify(name);

        let exists: Option<DbId> = sqlx::query_scalar("SELECT id FROM kb_nodes WHERE kb_id = $1")
            .bind(&slug)
            .fetch_optional(&mut *conn)
            .await?;
        if exists.is_none() {
            return Ok(slug);
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kb_nodes WHERE kb_id LIKE $1")
            .bind(format!("{slug}%"))
            .fetch_one(conn)
            .await?;
        Ok(format!("{slug}_{}", count + 1))
    }

    /// Load the `(id, parent_id)` link structure of the whole forest.
    async fn load_links(
        conn: &mut sqlx::PgConnection,
    ) -> Result<Vec<(DbId, Option<DbId>)>, sqlx::Error> {
        sqlx::query_as("SELECT id, parent_id FROM kb_nodes ORDER BY id")
            .fetch_all(conn)
            .await
    }

    /// Create a node, deriving its slug from the name and registering it
    /// in the parent's `children_ids` when a parent is given.
    pub async fn create(pool: &PgPool, input: &CreateKbNode) -> Result<KbNode, DbError> {
        let mut tx = pool.begin().await?;

        if let Some(parent_id) = input.parent_id {
            let parent: Option<DbId> = sqlx::query_scalar("SELECT id FROM kb_nodes WHERE id = $1")
                .bind(parent_id)
                .fetch_optional(&mut *tx)
                .await?;
            if parent.is_none() {
                return Err(DbError::not_found("KbNode", parent_id));
            }
        }

        let slug = Self::unique_slug(&mut tx, &input.name).await?;

        let query = format!(
            "INSERT INTO kb_nodes
                (kb_id, name, name_vi, node_type, parent_id, description, description_vi,
                 visual_cues, visual_cues_vi, related_kb_ids, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {KB_COLUMNS}"
        );
        let node = sqlx::query_as::<_, KbNode>(&query)
            .bind(&slug)
            .bind(&input.name)
            .bind(input.name_vi.as_deref().unwrap_or(""))
            .bind(input.node_type.as_deref().unwrap_or("concept"))
            .bind(input.parent_id)
            .bind(input.description.as_deref().unwrap_or(""))
            .bind(input.description_vi.as_deref().unwrap_or(""))
            .bind(input.visual_cues.as_deref().unwrap_or(""))
            .bind(input.visual_cues_vi.as_deref().unwrap_or(""))
            .bind(&input.related_kb_ids)
            .bind(&input.tags)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(parent_id) = input.parent_id {
            sqlx::query(
                "UPDATE kb_nodes SET children_ids = array_append(children_ids, $2),
                    updated_at = now()
                 WHERE id = $1",
            )
            .bind(parent_id)
            .bind(node.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(node_id = node.id, kb_id = %node.kb_id, "KB node created");
        Ok(node)
    }

    /// Find a node by its database ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<KbNode>, sqlx::Error> {
        let query = format!("SELECT {KB_COLUMNS} FROM kb_nodes WHERE id = $1");
        sqlx::query_as::<_, KbNode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a node by its slug.
    pub async fn find_by_kb_id(pool: &PgPool, kb_id: &str) -> Result<Option<KbNode>, sqlx::Error> {
        let query = format!("SELECT {KB_COLUMNS} FROM kb_nodes WHERE kb_id = $1");
        sqlx::query_as::<_, KbNode>(&query)
            .bind(kb_id)
            .fetch_optional(pool)
            .await
    }

    /// List nodes alphabetically, optionally filtered by a search term
    /// (matched against name, slug and tags) and a node type.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        node_type: Option<&str>,
    ) -> Result<Vec<KbNode>, sqlx::Error> {
        let query = format!(
            "SELECT {KB_COLUMNS} FROM kb_nodes
             WHERE ($1::text IS NULL
                    OR name ILIKE '%' || $1 || '%'
                    OR kb_id ILIKE '%' || $1 || '%'
                    OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE t ILIKE '%' || $1 || '%'))
               AND ($2::text IS NULL OR node_type = $2)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, KbNode>(&query)
            .bind(search)
            .bind(node_type)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. A name change re-derives the slug; a parent
    /// change updates both sides of the reciprocal link and is rejected
    /// when the new parent lies inside the node's own subtree.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateKbNode,
    ) -> Result<KbNode, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {KB_COLUMNS} FROM kb_nodes WHERE id = $1 FOR UPDATE");
        let node = sqlx::query_as::<_, KbNode>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("KbNode", id))?;

        let new_slug = match &input.name {
            Some(name) if slugify(name) != node.kb_id => {
                Some(Self::unique_slug(&mut tx, name).await?)
            }
            _ => None,
        };

        let query = format!(
            "UPDATE kb_nodes SET
                name = COALESCE($2, name),
                kb_id = COALESCE($3, kb_id),
                name_vi = COALESCE($4, name_vi),
                node_type = COALESCE($5, node_type),
                description = COALESCE($6, description),
                description_vi = COALESCE($7, description_vi),
                visual_cues = COALESCE($8, visual_cues),
                visual_cues_vi = COALESCE($9, visual_cues_vi),
                related_kb_ids = COALESCE($10, related_kb_ids),
                tags = COALESCE($11, tags),
                updated_at = now()
             WHERE id = $1
             RETURNING {KB_COLUMNS}"
        );
        let mut updated = sqlx::query_as::<_, KbNode>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&new_slug)
            .bind(&input.name_vi)
            .bind(&input.node_type)
            .bind(&input.description)
            .bind(&input.description_vi)
            .bind(&input.visual_cues)
            .bind(&input.visual_cues_vi)
            .bind(&input.related_kb_ids)
            .bind(&input.tags)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(new_parent) = input.parent_id {
            if new_parent != node.parent_id {
                if let Some(parent_id) = new_parent {
                    let links = Self::load_links(&mut tx).await?;
                    if is_in_subtree(parent_id, id, &parent_map(&links)) {
                        return Err(DbError::Core(CoreError::Validation(format!(
                            "Cannot move KB node {id} under its own subtree"
                        ))));
                    }
                }

                if let Some(old_parent) = node.parent_id {
                    sqlx::query(
                        "UPDATE kb_nodes SET children_ids = array_remove(children_ids, $2),
                            updated_at = now()
                         WHERE id = $1",
                    )
                    .bind(old_parent)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                }

                if let Some(parent_id) = new_parent {
                    let appended = sqlx::query(
                        "UPDATE kb_nodes SET children_ids = array_append(children_ids, $2),
                            updated_at = now()
                         WHERE id = $1",
                    )
                    .bind(parent_id)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                    if appended.rows_affected() == 0 {
                        return Err(DbError::not_found("KbNode", parent_id));
                    }
                }

                let query = format!(
                    "UPDATE kb_nodes SET parent_id = $2, updated_at = now()
                     WHERE id = $1
                     RETURNING {KB_COLUMNS}"
                );
                updated = sqlx::query_as::<_, KbNode>(&query)
                    .bind(id)
                    .bind(new_parent)
                    .fetch_one(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a node.
    ///
    /// `recursive = true` removes the node and its entire subtree
    /// depth-first. `recursive = false` moves each direct child up to the
    /// node's former parent (preserving connectivity), then removes the
    /// node. In both modes the removed ids are purged from every other
    /// node's `related_kb_ids` and from the former parent's
    /// `children_ids`.
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
        recursive: bool,
    ) -> Result<KbDeleteOutcome, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {KB_COLUMNS} FROM kb_nodes WHERE id = $1 FOR UPDATE");
        let node = sqlx::query_as::<_, KbNode>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("KbNode", id))?;

        let links = Self::load_links(&mut tx).await?;
        let children: Vec<DbId> = links
            .iter()
            .filter(|(_, parent)| *parent == Some(id))
            .map(|(child, _)| *child)
            .collect();

        let (removed_ids, reparented_ids) = if recursive {
            let removed = collect_subtree(id, &child_map(&links));
            sqlx::query("DELETE FROM kb_nodes WHERE id = ANY($1)")
                .bind(&removed)
                .execute(&mut *tx)
                .await?;
            (removed, Vec::new())
        } else {
            sqlx::query("UPDATE kb_nodes SET parent_id = $2, updated_at = now() WHERE id = ANY($1)")
                .bind(&children)
                .bind(node.parent_id)
                .execute(&mut *tx)
                .await?;

            if let Some(parent_id) = node.parent_id {
                // Hand the children to the former parent while dropping the
                // deleted node from its child list.
                sqlx::query(
                    "UPDATE kb_nodes SET children_ids = array_remove(children_ids, $2) || $3,
                        updated_at = now()
                     WHERE id = $1",
                )
                .bind(parent_id)
                .bind(id)
                .bind(&children)
                .execute(&mut *tx)
                .await?;
            }

            sqlx::query("DELETE FROM kb_nodes WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            (vec![id], children)
        };

        if recursive {
            if let Some(parent_id) = node.parent_id {
                sqlx::query(
                    "UPDATE kb_nodes SET children_ids = array_remove(children_ids, $2),
                        updated_at = now()
                     WHERE id = $1",
                )
                .bind(parent_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
        }

        // Purge the removed ids from every remaining cross-link.
        sqlx::query(
            "UPDATE kb_nodes SET
                related_kb_ids = (SELECT COALESCE(array_agg(r), ARRAY[]::bigint[])
                                  FROM unnest(related_kb_ids) AS r
                                  WHERE NOT (r = ANY($1))),
                updated_at = now()
             WHERE related_kb_ids && $1",
        )
        .bind(&removed_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            node_id = id,
            recursive,
            removed = removed_ids.len(),
            reparented = reparented_ids.len(),
            "KB node deleted"
        );
        Ok(KbDeleteOutcome {
            removed_ids,
            reparented_ids,
        })
    }

    /// Resolve a node's ancestor chain, ordered root-first and excluding
    /// the node itself. A visited set guards against corrupt cyclic links.
    pub async fn ancestors(pool: &PgPool, id: DbId) -> Result<Vec<KbNode>, DbError> {
        let node = Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| DbError::not_found("KbNode", id))?;

        let mut ancestors = Vec::new();
        let mut visited: HashSet<DbId> = HashSet::from([id]);
        let mut current_parent = node.parent_id;

        while let Some(parent_id) = current_parent {
            if !visited.insert(parent_id) {
                break;
            }
            let Some(parent) = Self::find_by_id(pool, parent_id).await? else {
                break;
            };
            current_parent = parent.parent_id;
            ancestors.push(parent);
        }

        ancestors.reverse();
        Ok(ancestors)
    }

    /// Resolve each requested node together with its ancestor chain for
    /// context assembly. Missing ids are skipped rather than failing the
    /// whole request.
    pub async fn context_entries(
        pool: &PgPool,
        node_ids: &[DbId],
    ) -> Result<Vec<(Vec<KbNode>, KbNode)>, DbError> {
        let mut entries = Vec::new();
        for &node_id in node_ids {
            let Some(node) = Self::find_by_id(pool, node_id).await? else {
                continue;
            };
            let ancestors = Self::ancestors(pool, node_id).await?;
            entries.push((ancestors, node));
        }
        Ok(entries)
    }
}
