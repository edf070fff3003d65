//! Post lifecycle manager
//!
//! Owns the post state machine: draft -> scheduled -> posted, with
//! scheduled -> failed on delivery errors and failed -> draft on explicit
//! resubmission. All validation completes before any write, and every
//! transition is a status-guarded conditional update, so concurrent
//! transitions on one post resolve to exactly one winner; the loser sees
//! `InvalidTransition`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::events::{Event, EventBus};
use crate::error::LifecycleError;
use crate::registry::PlatformRegistry;
use crate::types::{Engagement, Platform, Post, PostStatus};
use crate::{Database, PostwiseError, Result};

#[derive(Clone)]
pub struct LifecycleService {
    db: Arc<Database>,
    registry: Arc<PlatformRegistry>,
    event_bus: EventBus,
}

impl LifecycleService {
    pub fn new(db: Arc<Database>, registry: Arc<PlatformRegistry>, event_bus: EventBus) -> Self {
        Self {
            db,
            registry,
            event_bus,
        }
    }

    /// Create a new draft.
    ///
    /// Content length is not checked here: drafts may exceed platform
    /// limits while being iterated on. Validation happens at scheduling.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidPlatform` if the platform name is not in the
    /// closed set.
    pub async fn create(
        &self,
        platform: &str,
        content: String,
        media_ref: Option<String>,
    ) -> Result<Post> {
        let platform = Platform::parse(platform)
            .ok_or_else(|| LifecycleError::InvalidPlatform(platform.to_string()))?;

        let post = Post::new(platform, content, media_ref);
        self.db.create_post(&post).await?;

        info!(post_id = %post.id, platform = %platform, "draft created");
        self.event_bus.emit(Event::DraftCreated {
            post_id: post.id.clone(),
            platform: platform.to_string(),
        });

        Ok(post)
    }

    /// Replace a draft's content.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` if the post doesn't exist, or
    /// `InvalidTransition` if it has left draft.
    pub async fn update_draft(&self, post_id: &str, content: String) -> Result<Post> {
        if !self.db.update_post_content(post_id, &content).await? {
            return Err(self.transition_conflict(post_id, "edit").await);
        }
        self.fetch(post_id).await
    }

    /// Schedule a draft for publication.
    ///
    /// # Errors
    ///
    /// Fails with `ContentTooLong` if the content exceeds the platform's
    /// character limit, `PastSchedule` if the time is not strictly in the
    /// future, `NotFound` for an unknown id, and `InvalidTransition` if the
    /// post is not currently a draft.
    pub async fn schedule(&self, post_id: &str, scheduled_at: DateTime<Utc>) -> Result<Post> {
        let post = self.fetch(post_id).await?;

        let profile = self.registry.profile(post.platform)?;
        let length = post.content.chars().count();
        if length > profile.max_chars {
            return Err(LifecycleError::ContentTooLong {
                platform: post.platform.to_string(),
                length,
                max: profile.max_chars,
            }
            .into());
        }

        if scheduled_at <= Utc::now() {
            return Err(LifecycleError::PastSchedule {
                scheduled_at: scheduled_at.timestamp(),
            }
            .into());
        }

        let ts = scheduled_at.timestamp();
        if !self.db.mark_scheduled(post_id, ts).await? {
            return Err(self.transition_conflict(post_id, "schedule").await);
        }

        info!(post_id, scheduled_at = ts, "post scheduled");
        self.event_bus.emit(Event::PostScheduled {
            post_id: post_id.to_string(),
            scheduled_at: ts,
        });

        self.fetch(post_id).await
    }

    /// Record that a scheduled post went out.
    pub async fn mark_posted(&self, post_id: &str, posted_at: DateTime<Utc>) -> Result<Post> {
        let ts = posted_at.timestamp();
        if !self.db.mark_posted(post_id, ts).await? {
            return Err(self.transition_conflict(post_id, "mark posted").await);
        }

        info!(post_id, posted_at = ts, "post published");
        self.event_bus.emit(Event::PostPublished {
            post_id: post_id.to_string(),
            posted_at: ts,
        });

        self.fetch(post_id).await
    }

    /// Record a delivery failure. The reason is retained for observability
    /// only; the core never interprets it.
    pub async fn mark_failed(&self, post_id: &str, reason: &str) -> Result<Post> {
        if !self.db.mark_failed(post_id, reason).await? {
            return Err(self.transition_conflict(post_id, "mark failed").await);
        }

        info!(post_id, reason, "post delivery failed");
        self.event_bus.emit(Event::PostFailed {
            post_id: post_id.to_string(),
            reason: reason.to_string(),
        });

        self.fetch(post_id).await
    }

    /// Return a failed post to draft, clearing its schedule and failure
    /// state. Caller-initiated, never automatic.
    pub async fn resubmit(&self, post_id: &str) -> Result<Post> {
        if !self.db.mark_resubmitted(post_id).await? {
            return Err(self.transition_conflict(post_id, "resubmit").await);
        }

        info!(post_id, "post resubmitted as draft");
        self.event_bus.emit(Event::PostResubmitted {
            post_id: post_id.to_string(),
        });

        self.fetch(post_id).await
    }

    /// Replace a posted post's engagement snapshot wholesale. Platforms
    /// report cumulative totals, not deltas, so each call is authoritative.
    ///
    /// # Errors
    ///
    /// Fails with `NegativeValue` if any counter is negative, `NotFound`
    /// for an unknown id, and `InvalidTransition` unless the post is
    /// currently posted.
    pub async fn record_engagement(&self, post_id: &str, engagement: Engagement) -> Result<Post> {
        if let Some((field, value)) = engagement.first_negative() {
            return Err(LifecycleError::NegativeValue { field, value }.into());
        }

        if !self.db.update_engagement(post_id, engagement).await? {
            return Err(self.transition_conflict(post_id, "record engagement").await);
        }

        self.event_bus.emit(Event::EngagementRecorded {
            post_id: post_id.to_string(),
        });

        self.fetch(post_id).await
    }

    /// Get a post by id.
    pub async fn get(&self, post_id: &str) -> Result<Option<Post>> {
        self.db.get_post(post_id).await
    }

    async fn fetch(&self, post_id: &str) -> Result<Post> {
        self.db
            .get_post(post_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(post_id.to_string()).into())
    }

    /// A guarded transition matched no row: resolve whether the post is
    /// missing or in the wrong state.
    async fn transition_conflict(&self, post_id: &str, action: &'static str) -> PostwiseError {
        match self.db.get_post(post_id).await {
            Ok(Some(post)) => LifecycleError::InvalidTransition {
                post_id: post_id.to_string(),
                from: post.status,
                action,
            }
            .into(),
            Ok(None) => LifecycleError::NotFound(post_id.to_string()).into(),
            Err(e) => e,
        }
    }
}
