//! Integration tests for hierarchy integrity: cascading deletes down the
//! Project -> Video -> Segment -> Region -> Caption chain and dereference
//! deletes for subparts, categories and tags.

use sqlx::PgPool;
use vidnote_core::types::DbId;
use vidnote_db::models::caption::CreateCaption;
use vidnote_db::models::category::CreateCategory;
use vidnote_db::models::project::CreateProject;
use vidnote_db::models::region::CreateRegion;
use vidnote_db::models::segment::CreateSegment;
use vidnote_db::models::subpart::CreateSubpart;
use vidnote_db::models::tag::CreateTag;
use vidnote_db::models::video::{CreateVideo, UpdateVideo};
use vidnote_db::repositories::{
    CaptionRepo, CategoryRepo, ProjectRepo, RegionRepo, SegmentRepo, SubpartRepo, TagRepo,
    VideoRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const UPLOADER: DbId = 1;

struct Fixture {
    project_id: DbId,
    subpart_id: DbId,
    video_id: DbId,
    segment_id: DbId,
    region_id: DbId,
    region_caption_id: DbId,
    segment_caption_id: DbId,
}

/// Build a full hierarchy: project -> subpart -> video -> segment with one
/// region, a region-level caption and a segment-level caption.
async fn seed_hierarchy(pool: &PgPool) -> Fixture {
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            name: "Cascade Test".to_string(),
            description: None,
            created_by: UPLOADER,
        },
    )
    .await
    .unwrap();

    let subpart = SubpartRepo::create(
        pool,
        project.id,
        &CreateSubpart {
            name: "Part 1".to_string(),
            description: None,
            assigned_user_ids: vec![],
            reviewer_ids: vec![],
        },
    )
    .await
    .unwrap();

    let video = VideoRepo::create(
        pool,
        &CreateVideo {
            project_id: project.id,
            subpart_id: Some(subpart.id),
            filename: "clip.mp4".to_string(),
            original_name: "clip.mp4".to_string(),
            file_path: None,
            file_size: None,
            thumbnail: None,
            duration: Some(12.0),
            width: None,
            height: None,
            uploaded_by: UPLOADER,
        },
    )
    .await
    .unwrap();

    let segment = SegmentRepo::create(
        pool,
        video.id,
        &CreateSegment {
            name: None,
            start_time: 0.0,
            end_time: 4.0,
            created_by: UPLOADER,
        },
    )
    .await
    .unwrap();

    let region = RegionRepo::create(
        pool,
        segment.id,
        &CreateRegion {
            frame_time: 1.0,
            brush_mask: None,
            segmented_mask: None,
            label: Some("Drum".to_string()),
            color: None,
            category_id: None,
            category_name: None,
            created_by: UPLOADER,
        },
    )
    .await
    .unwrap();

    let region_caption = CaptionRepo::create_or_update(
        pool,
        &caption_for(segment.id, video.id, Some(region.id)),
    )
    .await
    .unwrap();

    let segment_caption =
        CaptionRepo::create_or_update(pool, &caption_for(segment.id, video.id, None))
            .await
            .unwrap();

    Fixture {
        project_id: project.id,
        subpart_id: subpart.id,
        video_id: video.id,
        segment_id: segment.id,
        region_id: region.id,
        region_caption_id: region_caption.id,
        segment_caption_id: segment_caption.id,
    }
}

fn caption_for(segment_id: DbId, video_id: DbId, region_id: Option<DbId>) -> CreateCaption {
    CreateCaption {
        segment_id,
        video_id,
        region_id,
        visual_caption: Some("A drum".to_string()),
        contextual_caption: None,
        knowledge_caption: None,
        combined_caption: None,
        visual_caption_vi: None,
        contextual_caption_vi: None,
        knowledge_caption_vi: None,
        combined_caption_vi: None,
        created_by: UPLOADER,
    }
}

// ---------------------------------------------------------------------------
// Cascading deletes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_project_cascade_removes_entire_hierarchy(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    assert!(ProjectRepo::delete_cascade(&pool, fx.project_id)
        .await
        .unwrap());

    assert!(ProjectRepo::find_by_id(&pool, fx.project_id)
        .await
        .unwrap()
        .is_none());
    assert!(VideoRepo::find_by_id(&pool, fx.video_id)
        .await
        .unwrap()
        .is_none());
    assert!(SegmentRepo::find_by_id(&pool, fx.segment_id)
        .await
        .unwrap()
        .is_none());
    assert!(RegionRepo::find_by_id(&pool, fx.region_id)
        .await
        .unwrap()
        .is_none());
    assert!(CaptionRepo::find_by_id(&pool, fx.region_caption_id)
        .await
        .unwrap()
        .is_none());
    assert!(CaptionRepo::find_by_id(&pool, fx.segment_caption_id)
        .await
        .unwrap()
        .is_none());
    assert!(SubpartRepo::list_for_project(&pool, fx.project_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_video_cascade_removes_segments_regions_captions(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    assert!(VideoRepo::delete_cascade(&pool, fx.video_id).await.unwrap());

    assert!(VideoRepo::find_by_id(&pool, fx.video_id)
        .await
        .unwrap()
        .is_none());
    assert!(SegmentRepo::list_for_video(&pool, fx.video_id)
        .await
        .unwrap()
        .is_empty());
    assert!(RegionRepo::find_by_id(&pool, fx.region_id)
        .await
        .unwrap()
        .is_none());
    assert!(CaptionRepo::find_by_id(&pool, fx.region_caption_id)
        .await
        .unwrap()
        .is_none());

    // The project and subpart survive.
    assert!(ProjectRepo::find_by_id(&pool, fx.project_id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_segment_cascade_removes_both_caption_levels(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    assert!(SegmentRepo::delete_cascade(&pool, fx.segment_id)
        .await
        .unwrap());

    assert!(SegmentRepo::find_by_id(&pool, fx.segment_id)
        .await
        .unwrap()
        .is_none());
    assert!(RegionRepo::find_by_id(&pool, fx.region_id)
        .await
        .unwrap()
        .is_none());
    assert!(CaptionRepo::find_by_id(&pool, fx.region_caption_id)
        .await
        .unwrap()
        .is_none());
    assert!(CaptionRepo::find_by_id(&pool, fx.segment_caption_id)
        .await
        .unwrap()
        .is_none());

    // The video survives.
    assert!(VideoRepo::find_by_id(&pool, fx.video_id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_region_cascade_keeps_segment_level_caption(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    assert!(RegionRepo::delete_cascade(&pool, fx.region_id).await.unwrap());

    assert!(RegionRepo::find_by_id(&pool, fx.region_id)
        .await
        .unwrap()
        .is_none());
    assert!(CaptionRepo::find_by_id(&pool, fx.region_caption_id)
        .await
        .unwrap()
        .is_none());
    // The segment-level caption is untouched.
    assert!(CaptionRepo::find_by_id(&pool, fx.segment_caption_id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_double_delete_is_idempotent(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    assert!(VideoRepo::delete_cascade(&pool, fx.video_id).await.unwrap());
    // Second delete finds nothing and reports it, without erroring.
    assert!(!VideoRepo::delete_cascade(&pool, fx.video_id).await.unwrap());

    assert!(!SegmentRepo::delete_cascade(&pool, fx.segment_id)
        .await
        .unwrap());
    assert!(!ProjectRepo::delete_cascade(&pool, 424242).await.unwrap());
}

// ---------------------------------------------------------------------------
// Dereference deletes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_subpart_delete_dereferences_videos(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    assert!(SubpartRepo::delete(&pool, fx.project_id, fx.subpart_id)
        .await
        .unwrap());

    let video = VideoRepo::find_by_id(&pool, fx.video_id).await.unwrap().unwrap();
    assert_eq!(video.subpart_id, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_subpart_delete_scoped_to_project(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    let other = ProjectRepo::create(
        &pool,
        &CreateProject {
            name: "Other".to_string(),
            description: None,
            created_by: UPLOADER,
        },
    )
    .await
    .unwrap();

    // Wrong project: nothing is deleted or dereferenced.
    assert!(!SubpartRepo::delete(&pool, other.id, fx.subpart_id)
        .await
        .unwrap());
    let video = VideoRepo::find_by_id(&pool, fx.video_id).await.unwrap().unwrap();
    assert_eq!(video.subpart_id, Some(fx.subpart_id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_category_delete_clears_region_reference(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    let category = CategoryRepo::create(
        &pool,
        fx.project_id,
        &CreateCategory {
            name: "Instrument".to_string(),
            description: None,
            color: None,
            created_by: UPLOADER,
        },
    )
    .await
    .unwrap();

    sqlx::query("UPDATE regions SET category_id = $2, category_name = $3 WHERE id = $1")
        .bind(fx.region_id)
        .bind(category.id)
        .bind(&category.name)
        .execute(&pool)
        .await
        .unwrap();

    assert!(CategoryRepo::delete(&pool, category.id).await.unwrap());

    let region = RegionRepo::find_by_id(&pool, fx.region_id).await.unwrap().unwrap();
    assert_eq!(region.category_id, None);
    assert_eq!(region.category_name, "");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_tag_delete_removes_from_video_collections(pool: PgPool) {
    let fx = seed_hierarchy(&pool).await;

    let keep = TagRepo::create(
        &pool,
        fx.project_id,
        &CreateTag {
            name: "outdoor".to_string(),
            color: None,
        },
    )
    .await
    .unwrap();
    let drop = TagRepo::create(
        &pool,
        fx.project_id,
        &CreateTag {
            name: "night".to_string(),
            color: None,
        },
    )
    .await
    .unwrap();

    VideoRepo::update(
        &pool,
        fx.video_id,
        &UpdateVideo {
            tag_ids: Some(vec![keep.id, drop.id]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(TagRepo::delete(&pool, drop.id).await.unwrap());

    let video = VideoRepo::find_by_id(&pool, fx.video_id).await.unwrap().unwrap();
    assert_eq!(video.tag_ids, vec![keep.id]);
    assert!(TagRepo::find_by_id(&pool, drop.id).await.unwrap().is_none());
}
