//! End-to-end tests covering the main editorial workflow
//!
//! Drives the full stack (facade -> services -> sqlite) the way a dashboard
//! layer would: draft, validate-at-schedule, publish, record engagement,
//! aggregate.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use libpostwise::completion::mock::MockCompletion;
use libpostwise::error::LifecycleError;
use libpostwise::service::PostwiseService;
use libpostwise::{Config, Engagement, Platform, PostStatus, PostwiseError, Tone};
use tempfile::TempDir;

/// Setup test service with temporary database and the given mock backend
async fn setup_test_service(client: MockCompletion) -> (PostwiseService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let mut config = Config::default_config();
    config.database.path = db_path.to_str().unwrap().to_string();

    let service = PostwiseService::from_config(config, Arc::new(client))
        .await
        .unwrap();

    (service, temp_dir)
}

#[tokio::test]
async fn test_draft_trim_schedule_post_engage_summarize() -> Result<()> {
    let (service, _temp_dir) = setup_test_service(MockCompletion::freeform("unused")).await;

    // A 300-character draft for twitter is accepted...
    let draft = service
        .lifecycle()
        .create("twitter", "a".repeat(300), None)
        .await?;
    assert_eq!(draft.status, PostStatus::Draft);

    // ...but cannot be scheduled past the 280-character limit
    let result = service
        .lifecycle()
        .schedule(&draft.id, Utc::now() + Duration::hours(1))
        .await;
    match result {
        Err(PostwiseError::Lifecycle(LifecycleError::ContentTooLong { length, max, .. })) => {
            assert_eq!(length, 300);
            assert_eq!(max, 280);
        }
        other => panic!("Expected ContentTooLong, got {:?}", other.map(|p| p.status)),
    }

    // Trim to 100 characters and schedule an hour out
    service.lifecycle().update_draft(&draft.id, "a".repeat(100)).await?;
    let scheduled = service
        .lifecycle()
        .schedule(&draft.id, Utc::now() + Duration::hours(1))
        .await?;
    assert_eq!(scheduled.status, PostStatus::Scheduled);

    // Publish and report engagement
    let posted = service.lifecycle().mark_posted(&draft.id, Utc::now()).await?;
    assert_eq!(posted.status, PostStatus::Posted);

    service
        .lifecycle()
        .record_engagement(&draft.id, Engagement::new(10, 2, 1, 500))
        .await?;

    // Aggregate over the single post
    let summary = service.analytics().summary().await?;
    assert_eq!(summary.posted_count, 1);
    assert_eq!(summary.total_likes, 10);
    assert_eq!(summary.total_comments, 2);
    assert_eq!(summary.total_shares, 1);
    assert_eq!(summary.total_reach, 500);
    assert_eq!(summary.avg_engagement_per_post, 13.0);

    Ok(())
}

#[tokio::test]
async fn test_schedule_in_the_past_is_rejected() -> Result<()> {
    let (service, _temp_dir) = setup_test_service(MockCompletion::freeform("unused")).await;

    let draft = service
        .lifecycle()
        .create("facebook", "Evergreen content".to_string(), None)
        .await?;

    let result = service
        .lifecycle()
        .schedule(&draft.id, Utc::now() - Duration::seconds(1))
        .await;
    assert!(matches!(
        result,
        Err(PostwiseError::Lifecycle(LifecycleError::PastSchedule { .. }))
    ));

    Ok(())
}

#[tokio::test]
async fn test_generated_fallback_content_flows_into_a_draft() -> Result<()> {
    // The model ignores the shape hint entirely
    let (service, _temp_dir) =
        setup_test_service(MockCompletion::freeform("not json at all")).await;

    let suggestion = service
        .generation()
        .generate_content("Announce the summer workshop series", Platform::Twitter, Tone::Friendly)
        .await?;

    // Raw reply carried through verbatim, never an error
    assert_eq!(suggestion.content, "not json at all");
    assert_eq!(suggestion.title, "Announce the summer workshop series...");
    assert_eq!(suggestion.platform, Platform::Twitter);

    // Fallback content is ordinary draft material
    let draft = service
        .lifecycle()
        .create(suggestion.platform.as_str(), suggestion.content, None)
        .await?;
    let scheduled = service.schedule_in(&draft.id, "1h").await?;
    assert_eq!(scheduled.status, PostStatus::Scheduled);

    Ok(())
}

#[tokio::test]
async fn test_generation_unavailable_surfaces_to_caller() {
    let (service, _temp_dir) =
        setup_test_service(MockCompletion::unavailable("socket closed")).await;

    let result = service
        .generation()
        .generate_content("prompt", Platform::Linkedin, Tone::Professional)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_failed_delivery_resubmit_and_reschedule() -> Result<()> {
    let (service, _temp_dir) = setup_test_service(MockCompletion::freeform("unused")).await;

    let draft = service
        .lifecycle()
        .create("instagram", "Behind the scenes".to_string(), Some("asset://bts.jpg".to_string()))
        .await?;
    service
        .lifecycle()
        .schedule(&draft.id, Utc::now() + Duration::hours(2))
        .await?;

    let failed = service
        .lifecycle()
        .mark_failed(&draft.id, "platform API returned 503")
        .await?;
    assert_eq!(failed.status, PostStatus::Failed);

    // Engagement on a failed post is rejected regardless of values
    let result = service
        .lifecycle()
        .record_engagement(&draft.id, Engagement::default())
        .await;
    assert!(matches!(
        result,
        Err(PostwiseError::Lifecycle(LifecycleError::InvalidTransition { .. }))
    ));

    // Resubmission returns to draft and the post can go out again
    let resubmitted = service.lifecycle().resubmit(&draft.id).await?;
    assert_eq!(resubmitted.status, PostStatus::Draft);
    assert_eq!(resubmitted.media_ref, Some("asset://bts.jpg".to_string()));

    let rescheduled = service
        .lifecycle()
        .schedule(&draft.id, Utc::now() + Duration::hours(3))
        .await?;
    assert_eq!(rescheduled.status, PostStatus::Scheduled);

    Ok(())
}

#[tokio::test]
async fn test_summary_over_empty_store_is_all_zero() -> Result<()> {
    let (service, _temp_dir) = setup_test_service(MockCompletion::freeform("unused")).await;

    let summary = service.analytics().summary().await?;
    assert_eq!(summary.posted_count, 0);
    assert_eq!(summary.total_likes, 0);
    assert_eq!(summary.total_reach, 0);
    assert_eq!(summary.avg_engagement_per_post, 0.0);

    let top = service.analytics().top_performers(5).await?;
    assert!(top.is_empty());

    Ok(())
}
