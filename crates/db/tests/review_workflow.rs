//! Integration tests for the review consensus workflow.
//!
//! Exercises vote casting, withdrawal, submit/revoke resets, and the
//! content-change watcher against a real database.

use sqlx::PgPool;
use vidnote_core::review::{ReviewAction, ReviewStatus, AUTO_RESET_COMMENT};
use vidnote_db::error::DbError;
use vidnote_db::models::caption::CreateCaption;
use vidnote_db::models::project::CreateProject;
use vidnote_db::models::region::CreateRegion;
use vidnote_db::models::segment::CreateSegment;
use vidnote_db::models::subpart::CreateSubpart;
use vidnote_db::models::video::{CreateVideo, UpdateVideo, Video};
use vidnote_db::repositories::{
    CaptionRepo, ProjectRepo, RegionRepo, ReviewRepo, SegmentRepo, SubpartRepo, VideoRepo,
};
use vidnote_core::error::CoreError;
use vidnote_core::types::DbId;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const UPLOADER: DbId = 1;

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: None,
        created_by: UPLOADER,
    }
}

fn new_video(project_id: DbId, subpart_id: Option<DbId>) -> CreateVideo {
    CreateVideo {
        project_id,
        subpart_id,
        filename: "a1b2c3.mp4".to_string(),
        original_name: "festival.mp4".to_string(),
        file_path: None,
        file_size: Some(1024),
        thumbnail: None,
        duration: Some(30.0),
        width: Some(1920),
        height: Some(1080),
        uploaded_by: UPLOADER,
    }
}

fn new_caption(segment_id: DbId, video_id: DbId, region_id: Option<DbId>) -> CreateCaption {
    CreateCaption {
        segment_id,
        video_id,
        region_id,
        visual_caption: Some("A dancer in red".to_string()),
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

fn new_region(created_by: DbId) -> CreateRegion {
    CreateRegion {
        frame_time: 1.5,
        brush_mask: None,
        segmented_mask: None,
        label: Some("Dancer".to_string()),
        color: None,
        category_id: None,
        category_name: None,
        created_by,
    }
}

/// Create a project and a video with no subpart (any reviewer suffices).
async fn seed_video(pool: &PgPool) -> Video {
    let project = ProjectRepo::create(pool, &new_project("Review Test"))
        .await
        .unwrap();
    VideoRepo::create(pool, &new_video(project.id, None))
        .await
        .unwrap()
}

/// Create a project, a subpart requiring the given reviewers, and a video
/// assigned to it.
async fn seed_video_with_reviewers(pool: &PgPool, reviewers: &[DbId]) -> Video {
    let project = ProjectRepo::create(pool, &new_project("Consensus Test"))
        .await
        .unwrap();
    let subpart = SubpartRepo::create(
        pool,
        project.id,
        &CreateSubpart {
            name: "Part 1".to_string(),
            description: None,
            assigned_user_ids: vec![],
            reviewer_ids: reviewers.to_vec(),
        },
    )
    .await
    .unwrap();
    VideoRepo::create(pool, &new_video(project.id, Some(subpart.id)))
        .await
        .unwrap()
}

async fn review_status(pool: &PgPool, video_id: DbId) -> String {
    VideoRepo::find_by_id(pool, video_id)
        .await
        .unwrap()
        .unwrap()
        .review_status
}

// ---------------------------------------------------------------------------
// Vote casting and recomputation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_single_approval_approves_without_required_set(pool: PgPool) {
    let video = seed_video(&pool).await;

    let (status, reviews) =
        ReviewRepo::cast_vote(&pool, video.id, 42, ReviewAction::Approve, "looks good")
            .await
            .unwrap();

    assert_eq!(status, ReviewStatus::Approved);
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].reviewer_id, 42);
    assert_eq!(reviews[0].action, "approve");

    let stored = VideoRepo::find_by_id(&pool, video.id).await.unwrap().unwrap();
    assert_eq!(stored.review_status, "approved");
    assert_eq!(stored.review_comment, "looks good");
    assert_eq!(stored.reviewed_by, Some(42));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_revote_replaces_never_duplicates(pool: PgPool) {
    let video = seed_video(&pool).await;

    ReviewRepo::cast_vote(&pool, video.id, 42, ReviewAction::Approve, "first pass")
        .await
        .unwrap();
    let (status, reviews) =
        ReviewRepo::cast_vote(&pool, video.id, 42, ReviewAction::Reject, "changed my mind")
            .await
            .unwrap();

    assert_eq!(status, ReviewStatus::Rejected);
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].action, "reject");
    assert_eq!(reviews[0].comment, "changed my mind");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reject_dominates_approvals(pool: PgPool) {
    let video = seed_video_with_reviewers(&pool, &[1, 2]).await;

    ReviewRepo::cast_vote(&pool, video.id, 1, ReviewAction::Approve, "")
        .await
        .unwrap();
    let (status, _) = ReviewRepo::cast_vote(&pool, video.id, 2, ReviewAction::Reject, "blurry")
        .await
        .unwrap();

    assert_eq!(status, ReviewStatus::Rejected);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_two_reviewer_consensus_scenario(pool: PgPool) {
    let video = seed_video_with_reviewers(&pool, &[1, 2]).await;

    // A approves: partial consensus.
    let (status, _) = ReviewRepo::cast_vote(&pool, video.id, 1, ReviewAction::Approve, "")
        .await
        .unwrap();
    assert_eq!(status, ReviewStatus::InReview);

    // B approves: full consensus.
    let (status, _) = ReviewRepo::cast_vote(&pool, video.id, 2, ReviewAction::Approve, "")
        .await
        .unwrap();
    assert_eq!(status, ReviewStatus::Approved);

    // A changes their vote to reject: rejection dominates.
    let (status, _) = ReviewRepo::cast_vote(&pool, video.id, 1, ReviewAction::Reject, "redo")
        .await
        .unwrap();
    assert_eq!(status, ReviewStatus::Rejected);

    // A withdraws: recomputed from B's approval alone.
    let (status, reviews) = ReviewRepo::withdraw_vote(&pool, video.id, 1).await.unwrap();
    assert_eq!(status, ReviewStatus::InReview);
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].reviewer_id, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_withdraw_without_vote_is_noop(pool: PgPool) {
    let video = seed_video(&pool).await;

    let (status, reviews) = ReviewRepo::withdraw_vote(&pool, video.id, 99).await.unwrap();
    assert_eq!(status, ReviewStatus::PendingReview);
    assert!(reviews.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_vote_on_missing_video_is_not_found(pool: PgPool) {
    let result = ReviewRepo::cast_vote(&pool, 9999, 1, ReviewAction::Approve, "").await;
    match result {
        Err(DbError::Core(CoreError::NotFound { entity, id })) => {
            assert_eq!(entity, "Video");
            assert_eq!(id, 9999);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Submit and revoke
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_submit_for_review_discards_votes(pool: PgPool) {
    let video = seed_video(&pool).await;

    ReviewRepo::cast_vote(&pool, video.id, 42, ReviewAction::Approve, "nice")
        .await
        .unwrap();

    let status = ReviewRepo::submit_for_review(&pool, video.id).await.unwrap();
    assert_eq!(status, ReviewStatus::PendingReview);

    let stored = VideoRepo::find_by_id(&pool, video.id).await.unwrap().unwrap();
    assert_eq!(stored.review_status, "pending_review");
    assert_eq!(stored.review_comment, "");
    assert_eq!(stored.reviewed_by, None);
    assert!(ReviewRepo::list_votes(&pool, video.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_revoke_approval_records_reason(pool: PgPool) {
    let video = seed_video(&pool).await;

    ReviewRepo::cast_vote(&pool, video.id, 42, ReviewAction::Approve, "")
        .await
        .unwrap();
    let status = ReviewRepo::revoke_approval(&pool, video.id, "Annotation guidelines changed")
        .await
        .unwrap();
    assert_eq!(status, ReviewStatus::NotSubmitted);

    let stored = VideoRepo::find_by_id(&pool, video.id).await.unwrap().unwrap();
    assert_eq!(stored.review_status, "not_submitted");
    assert_eq!(stored.review_comment, "Annotation guidelines changed");
    assert!(ReviewRepo::list_votes(&pool, video.id)
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Content-change watcher
// ---------------------------------------------------------------------------

/// Approve a freshly seeded video and return it with one segment.
async fn seed_approved_with_segment(pool: &PgPool) -> (Video, DbId) {
    let video = seed_video(pool).await;
    let segment = SegmentRepo::create(
        pool,
        video.id,
        &CreateSegment {
            name: None,
            start_time: 0.0,
            end_time: 5.0,
            created_by: UPLOADER,
        },
    )
    .await
    .unwrap();
    ReviewRepo::cast_vote(pool, video.id, 42, ReviewAction::Approve, "")
        .await
        .unwrap();
    assert_eq!(review_status(pool, video.id).await, "approved");
    (video, segment.id)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_caption_create_resets_approved_video(pool: PgPool) {
    let (video, segment_id) = seed_approved_with_segment(&pool).await;

    CaptionRepo::create_or_update(&pool, &new_caption(segment_id, video.id, None))
        .await
        .unwrap();

    let stored = VideoRepo::find_by_id(&pool, video.id).await.unwrap().unwrap();
    assert_eq!(stored.review_status, "not_submitted");
    assert_eq!(stored.review_comment, AUTO_RESET_COMMENT);
    assert_eq!(stored.reviewed_by, None);
    assert!(ReviewRepo::list_votes(&pool, video.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_region_mutations_reset_approved_video(pool: PgPool) {
    let (video, segment_id) = seed_approved_with_segment(&pool).await;

    let region = RegionRepo::create(&pool, segment_id, &new_region(UPLOADER))
        .await
        .unwrap();
    assert_eq!(review_status(&pool, video.id).await, "not_submitted");

    // Re-approve, then check deletion resets again.
    ReviewRepo::cast_vote(&pool, video.id, 42, ReviewAction::Approve, "")
        .await
        .unwrap();
    assert!(RegionRepo::delete_cascade(&pool, region.id).await.unwrap());
    assert_eq!(review_status(&pool, video.id).await, "not_submitted");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_content_mutation_on_non_approved_video_is_noop(pool: PgPool) {
    let video = seed_video(&pool).await;
    let segment = SegmentRepo::create(
        &pool,
        video.id,
        &CreateSegment {
            name: None,
            start_time: 0.0,
            end_time: 5.0,
            created_by: UPLOADER,
        },
    )
    .await
    .unwrap();

    ReviewRepo::submit_for_review(&pool, video.id).await.unwrap();
    CaptionRepo::create_or_update(&pool, &new_caption(segment.id, video.id, None))
        .await
        .unwrap();

    // Still pending: the watcher only fires on approved videos.
    assert_eq!(review_status(&pool, video.id).await, "pending_review");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_video_content_update_resets_approval(pool: PgPool) {
    let (video, _) = seed_approved_with_segment(&pool).await;

    VideoRepo::update(
        &pool,
        video.id,
        &UpdateVideo {
            duration: Some(31.5),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(review_status(&pool, video.id).await, "not_submitted");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_video_assignment_update_keeps_approval(pool: PgPool) {
    let (video, _) = seed_approved_with_segment(&pool).await;

    VideoRepo::update(
        &pool,
        video.id,
        &UpdateVideo {
            annotator_ids: Some(vec![7, 8]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Assignment changes are not content changes.
    assert_eq!(review_status(&pool, video.id).await, "approved");
}
