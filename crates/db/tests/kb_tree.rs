//! Integration tests for the knowledge-base concept forest: slug
//! collisions, reciprocal link maintenance, the two delete modes, ancestor
//! resolution and context assembly.

use assert_matches::assert_matches;
use sqlx::PgPool;
use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;
use vidnote_db::error::DbError;
use vidnote_db::models::kb_node::{
    assemble_context, build_tree, ContextLanguage, CreateKbNode, KbNode, UpdateKbNode,
};
use vidnote_db::repositories::KbRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_node(name: &str, parent_id: Option<DbId>) -> CreateKbNode {
    CreateKbNode {
        name: name.to_string(),
        name_vi: None,
        node_type: None,
        parent_id,
        description: None,
        description_vi: None,
        visual_cues: None,
        visual_cues_vi: None,
        related_kb_ids: vec![],
        tags: vec![],
    }
}

async fn get(pool: &PgPool, id: DbId) -> KbNode {
    KbRepo::find_by_id(pool, id).await.unwrap().unwrap()
}

// ---------------------------------------------------------------------------
// Creation and slugs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_derives_slug_and_links_parent(pool: PgPool) {
    let root = KbRepo::create(&pool, &new_node("Lion Dance", None)).await.unwrap();
    assert_eq!(root.kb_id, "lion_dance");
    assert_eq!(root.parent_id, None);

    let child = KbRepo::create(&pool, &new_node("Drum Beat", Some(root.id)))
        .await
        .unwrap();
    assert_eq!(child.parent_id, Some(root.id));

    // Reciprocal link registered on the parent.
    let root = get(&pool, root.id).await;
    assert_eq!(root.children_ids, vec![child.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_slug_collision_appends_suffix(pool: PgPool) {
    let first = KbRepo::create(&pool, &new_node("Lion Dance", None)).await.unwrap();
    let second = KbRepo::create(&pool, &new_node("Lion Dance", None)).await.unwrap();

    assert_eq!(first.kb_id, "lion_dance");
    assert_eq!(second.kb_id, "lion_dance_2");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_with_missing_parent_is_not_found(pool: PgPool) {
    let result = KbRepo::create(&pool, &new_node("Orphan", Some(404))).await;
    match result {
        Err(DbError::Core(CoreError::NotFound { entity, id })) => {
            assert_eq!(entity, "KbNode");
            assert_eq!(id, 404);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_by_slug(pool: PgPool) {
    let node = KbRepo::create(&pool, &new_node("Mid Autumn", None)).await.unwrap();
    let found = KbRepo::find_by_kb_id(&pool, "mid_autumn").await.unwrap().unwrap();
    assert_eq!(found.id, node.id);
}

// ---------------------------------------------------------------------------
// Reparenting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_reparent_updates_both_links(pool: PgPool) {
    let a = KbRepo::create(&pool, &new_node("A", None)).await.unwrap();
    let b = KbRepo::create(&pool, &new_node("B", None)).await.unwrap();
    let child = KbRepo::create(&pool, &new_node("Child", Some(a.id))).await.unwrap();

    let moved = KbRepo::update(
        &pool,
        child.id,
        &UpdateKbNode {
            parent_id: Some(Some(b.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.parent_id, Some(b.id));

    assert!(get(&pool, a.id).await.children_ids.is_empty());
    assert_eq!(get(&pool, b.id).await.children_ids, vec![child.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reparent_into_own_subtree_is_rejected(pool: PgPool) {
    let root = KbRepo::create(&pool, &new_node("Root", None)).await.unwrap();
    let mid = KbRepo::create(&pool, &new_node("Mid", Some(root.id))).await.unwrap();
    let leaf = KbRepo::create(&pool, &new_node("Leaf", Some(mid.id))).await.unwrap();

    let result = KbRepo::update(
        &pool,
        root.id,
        &UpdateKbNode {
            parent_id: Some(Some(leaf.id)),
            ..Default::default()
        },
    )
    .await;

    match result {
        Err(DbError::Core(CoreError::Validation(msg))) => {
            assert!(msg.contains("own subtree"));
        }
        other => panic!("expected Validation error, got {other:?}"),
    }

    // Nothing changed.
    assert_eq!(get(&pool, root.id).await.parent_id, None);
    assert_eq!(get(&pool, leaf.id).await.parent_id, Some(mid.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rename_rederives_slug(pool: PgPool) {
    let node = KbRepo::create(&pool, &new_node("Old Name", None)).await.unwrap();
    let updated = KbRepo::update(
        &pool,
        node.id,
        &UpdateKbNode {
            name: Some("New Name".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "New Name");
    assert_eq!(updated.kb_id, "new_name");
}

// ---------------------------------------------------------------------------
// Deletion modes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_reparent_delete_moves_children_up(pool: PgPool) {
    let root = KbRepo::create(&pool, &new_node("Root", None)).await.unwrap();
    let mid = KbRepo::create(&pool, &new_node("Mid", Some(root.id))).await.unwrap();
    let c1 = KbRepo::create(&pool, &new_node("C1", Some(mid.id))).await.unwrap();
    let c2 = KbRepo::create(&pool, &new_node("C2", Some(mid.id))).await.unwrap();

    let outcome = KbRepo::delete(&pool, mid.id, false).await.unwrap();
    assert_eq!(outcome.removed_ids, vec![mid.id]);
    assert_eq!(outcome.reparented_ids, vec![c1.id, c2.id]);

    assert!(KbRepo::find_by_id(&pool, mid.id).await.unwrap().is_none());
    assert_eq!(get(&pool, c1.id).await.parent_id, Some(root.id));
    assert_eq!(get(&pool, c2.id).await.parent_id, Some(root.id));

    // The former parent's child list no longer contains the deleted node
    // but contains both grandchildren.
    let root = get(&pool, root.id).await;
    assert!(!root.children_ids.contains(&mid.id));
    assert!(root.children_ids.contains(&c1.id));
    assert!(root.children_ids.contains(&c2.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_recursive_delete_removes_subtree(pool: PgPool) {
    let root = KbRepo::create(&pool, &new_node("Root", None)).await.unwrap();
    let mid = KbRepo::create(&pool, &new_node("Mid", Some(root.id))).await.unwrap();
    let leaf = KbRepo::create(&pool, &new_node("Leaf", Some(mid.id))).await.unwrap();
    let sibling = KbRepo::create(&pool, &new_node("Sibling", Some(root.id))).await.unwrap();

    let outcome = KbRepo::delete(&pool, mid.id, true).await.unwrap();
    assert_eq!(outcome.removed_ids, vec![mid.id, leaf.id]);
    assert!(outcome.reparented_ids.is_empty());

    assert!(KbRepo::find_by_id(&pool, mid.id).await.unwrap().is_none());
    assert!(KbRepo::find_by_id(&pool, leaf.id).await.unwrap().is_none());
    assert!(KbRepo::find_by_id(&pool, sibling.id).await.unwrap().is_some());
    assert_eq!(get(&pool, root.id).await.children_ids, vec![sibling.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_purges_related_links(pool: PgPool) {
    let target = KbRepo::create(&pool, &new_node("Target", None)).await.unwrap();
    let mut linked = new_node("Linked", None);
    linked.related_kb_ids = vec![target.id];
    let linked = KbRepo::create(&pool, &linked).await.unwrap();

    KbRepo::delete(&pool, target.id, false).await.unwrap();

    assert!(get(&pool, linked.id).await.related_kb_ids.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_node_is_not_found(pool: PgPool) {
    let result = KbRepo::delete(&pool, 404, true).await;
    assert_matches!(result, Err(DbError::Core(CoreError::NotFound { .. })));
}

// ---------------------------------------------------------------------------
// Ancestors and context
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_ancestors_root_first(pool: PgPool) {
    let root = KbRepo::create(&pool, &new_node("Root", None)).await.unwrap();
    let mid = KbRepo::create(&pool, &new_node("Mid", Some(root.id))).await.unwrap();
    let leaf = KbRepo::create(&pool, &new_node("Leaf", Some(mid.id))).await.unwrap();

    assert!(KbRepo::ancestors(&pool, root.id).await.unwrap().is_empty());

    let chain = KbRepo::ancestors(&pool, leaf.id).await.unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].id, root.id);
    assert_eq!(chain[1].id, mid.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_context_entries_skip_missing_nodes(pool: PgPool) {
    let mut root = new_node("Festivals", None);
    root.description = Some("Recurring cultural celebrations".to_string());
    let root = KbRepo::create(&pool, &root).await.unwrap();

    let mut leaf = new_node("Lion Dance", Some(root.id));
    leaf.description = Some("A lion costume dance".to_string());
    leaf.visual_cues = Some("Two performers, ornate head".to_string());
    let leaf = KbRepo::create(&pool, &leaf).await.unwrap();

    let entries = KbRepo::context_entries(&pool, &[leaf.id, 9999]).await.unwrap();
    assert_eq!(entries.len(), 1);

    let text = assemble_context(&entries, ContextLanguage::En);
    assert_eq!(
        text,
        "Festivals: Recurring cultural celebrations → \
         Lion Dance: A lion costume dance (Visual cues: Two performers, ornate head)"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_tree_listing_matches_links(pool: PgPool) {
    let root = KbRepo::create(&pool, &new_node("Root", None)).await.unwrap();
    let mid = KbRepo::create(&pool, &new_node("Mid", Some(root.id))).await.unwrap();
    KbRepo::create(&pool, &new_node("Leaf", Some(mid.id))).await.unwrap();

    let nodes = KbRepo::list(&pool, None, None).await.unwrap();
    let forest = build_tree(&nodes, None);

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].node.id, root.id);
    assert_eq!(forest[0].children.len(), 1);
    assert_eq!(forest[0].children[0].children.len(), 1);
}
