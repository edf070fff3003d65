//! Integration tests for PostwiseService
//!
//! Tests the service layer as a whole, including interactions between
//! services and the event stream.

use std::sync::Arc;

use chrono::{Duration, Timelike, Utc};
use libpostwise::completion::mock::MockCompletion;
use libpostwise::service::events::Event;
use libpostwise::service::timing::RecommendationSource;
use libpostwise::service::PostwiseService;
use libpostwise::{Config, Engagement, Platform, PostStatus, Tone};
use tempfile::TempDir;

/// Setup test service with temporary database
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
async fn test_service_initialization() {
    let (_service, _temp_dir) = setup_test_service(MockCompletion::freeform("hi")).await;
}

#[tokio::test]
async fn test_service_accessor_methods() {
    let (service, _temp_dir) = setup_test_service(MockCompletion::freeform("hi")).await;

    let _lifecycle = service.lifecycle();
    let _generation = service.generation();
    let _timing = service.timing();
    let _analytics = service.analytics();
    let _registry = service.registry();
    let mut _receiver = service.subscribe();
}

#[tokio::test]
async fn test_lifecycle_events_reach_subscribers() {
    let (service, _temp_dir) = setup_test_service(MockCompletion::freeform("hi")).await;
    let mut receiver = service.subscribe();

    let draft = service
        .lifecycle()
        .create("twitter", "Hello".to_string(), None)
        .await
        .unwrap();
    service
        .lifecycle()
        .schedule(&draft.id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    service
        .lifecycle()
        .mark_posted(&draft.id, Utc::now())
        .await
        .unwrap();
    service
        .lifecycle()
        .record_engagement(&draft.id, Engagement::new(1, 0, 0, 10))
        .await
        .unwrap();

    assert!(matches!(
        receiver.recv().await.unwrap(),
        Event::DraftCreated { .. }
    ));
    match receiver.recv().await.unwrap() {
        Event::PostScheduled { post_id, .. } => assert_eq!(post_id, draft.id),
        other => panic!("Expected PostScheduled, got {:?}", other),
    }
    assert!(matches!(
        receiver.recv().await.unwrap(),
        Event::PostPublished { .. }
    ));
    assert!(matches!(
        receiver.recv().await.unwrap(),
        Event::EngagementRecorded { .. }
    ));
}

#[tokio::test]
async fn test_schedule_at_recommended_adopts_advisor_time() {
    // Advisor recommends 23:59 with high confidence; with no history the
    // analyzer defers to it
    let reply = serde_json::json!({
        "recommended_times": ["23:59"],
        "reasoning": "Night-owl audience",
        "confidence": 0.9,
    });
    let (service, _temp_dir) = setup_test_service(MockCompletion::structured(reply)).await;

    let draft = service
        .lifecycle()
        .create("linkedin", "Industry insight".to_string(), None)
        .await
        .unwrap();

    let scheduled = service.schedule_at_recommended(&draft.id).await.unwrap();
    assert_eq!(scheduled.status, PostStatus::Scheduled);

    let scheduled_at =
        chrono::DateTime::from_timestamp(scheduled.scheduled_at.unwrap(), 0).unwrap();
    assert!(scheduled_at > Utc::now());
    assert_eq!(scheduled_at.hour(), 23);
    assert_eq!(scheduled_at.minute(), 59);
}

#[tokio::test]
async fn test_schedule_at_recommended_with_advisor_down() {
    let (service, _temp_dir) = setup_test_service(MockCompletion::unavailable("down")).await;

    let draft = service
        .lifecycle()
        .create("facebook", "Community update".to_string(), None)
        .await
        .unwrap();

    // Degrades silently to the registry's windows; scheduling still works
    let report = service.timing().analyze(Platform::Facebook).await.unwrap();
    assert_eq!(report.source, RecommendationSource::PlatformDefaults);

    let scheduled = service.schedule_at_recommended(&draft.id).await.unwrap();
    assert_eq!(scheduled.status, PostStatus::Scheduled);
}

#[tokio::test]
async fn test_timing_uses_recorded_history() {
    let reply = serde_json::json!({
        "recommended_times": ["03:00"],
        "reasoning": "should not be used",
        "confidence": 0.9,
    });
    let (service, _temp_dir) = setup_test_service(MockCompletion::structured(reply)).await;

    // Publish five posts and report engagement so history wins
    for i in 0..5i64 {
        let draft = service
            .lifecycle()
            .create("twitter", format!("post {}", i), None)
            .await
            .unwrap();
        service
            .lifecycle()
            .schedule(&draft.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        service
            .lifecycle()
            .mark_posted(&draft.id, Utc::now())
            .await
            .unwrap();
        service
            .lifecycle()
            .record_engagement(&draft.id, Engagement::new(10 + i, 0, 0, 100))
            .await
            .unwrap();
    }

    let report = service.timing().analyze(Platform::Twitter).await.unwrap();
    assert_eq!(report.source, RecommendationSource::History);
    assert_eq!(
        report.candidates.iter().map(|c| c.samples).sum::<usize>(),
        5
    );
}

#[tokio::test]
async fn test_generation_and_analytics_share_one_store() {
    let reply = serde_json::json!({
        "title": "Workshop time",
        "content": "Join our free workshop this Thursday!",
        "hashtags": ["#workshop"],
        "estimated_engagement": 9,
    });
    let (service, _temp_dir) = setup_test_service(MockCompletion::structured(reply)).await;

    let suggestion = service
        .generation()
        .generate_content("Promote the workshop", Platform::Instagram, Tone::Friendly)
        .await
        .unwrap();

    let draft = service
        .lifecycle()
        .create(
            suggestion.platform.as_str(),
            suggestion.content.clone(),
            None,
        )
        .await
        .unwrap();

    let counts = service.analytics().status_counts().await.unwrap();
    assert_eq!(counts.total, 1);
    assert_eq!(counts.draft, 1);

    service
        .lifecycle()
        .schedule(&draft.id, Utc::now() + Duration::minutes(30))
        .await
        .unwrap();
    service
        .lifecycle()
        .mark_posted(&draft.id, Utc::now())
        .await
        .unwrap();
    service
        .lifecycle()
        .record_engagement(&draft.id, Engagement::new(40, 6, 3, 900))
        .await
        .unwrap();

    let breakdown = service.analytics().platform_breakdown().await.unwrap();
    let instagram = breakdown.get(&Platform::Instagram).unwrap();
    assert_eq!(instagram.posts_count, 1);
    assert_eq!(instagram.total_likes, 40);

    let top = service.analytics().top_performers(1).await.unwrap();
    assert_eq!(top[0].content, "Join our free workshop this Thursday!");
}
