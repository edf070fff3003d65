//! Service layer for Postwise
//!
//! This module provides a clean, testable API for business logic that can be
//! consumed by a dashboard or automation layer without code duplication.
//!
//! # Architecture
//!
//! The service layer follows a facade pattern with `PostwiseService` as the
//! main entry point, coordinating specialized sub-services:
//!
//! - `LifecycleService`: the post state machine and its validation
//! - `GenerationService`: AI-assisted content with graceful degradation
//! - `TimingService`: optimal posting-time recommendations
//! - `AnalyticsService`: dashboard summary statistics
//! - `EventBus`: observability event distribution
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libpostwise::completion::mock::MockCompletion;
//! use libpostwise::service::PostwiseService;
//! use libpostwise::{Config, Tone};
//!
//! # async fn example() -> libpostwise::Result<()> {
//! let client = Arc::new(MockCompletion::freeform("Big news coming Friday!"));
//! let service = PostwiseService::from_config(Config::default_config(), client).await?;
//!
//! let suggestion = service
//!     .generation()
//!     .generate_content("Tease the product launch", libpostwise::Platform::Twitter, Tone::Casual)
//!     .await?;
//!
//! let draft = service
//!     .lifecycle()
//!     .create("twitter", suggestion.content, None)
//!     .await?;
//! service.schedule_in(&draft.id, "2h").await?;
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod events;
pub mod generation;
pub mod lifecycle;
pub mod timing;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use self::analytics::AnalyticsService;
use self::events::EventBus;
use self::generation::GenerationService;
use self::lifecycle::LifecycleService;
use self::timing::TimingService;
use crate::completion::CompletionApi;
use crate::registry::PlatformRegistry;
use crate::types::Post;
use crate::{Config, Database, Result};

/// Main service facade that coordinates all sub-services
///
/// Sub-services share the same `Arc<Database>`, `Arc<Config>`, and
/// `Arc<PlatformRegistry>` instances; the registry is built once here and
/// never mutated afterwards.
pub struct PostwiseService {
    db: Arc<Database>,
    registry: Arc<PlatformRegistry>,
    lifecycle: LifecycleService,
    generation: GenerationService,
    timing: TimingService,
    analytics: AnalyticsService,
    event_bus: EventBus,
}

impl PostwiseService {
    /// Create a service with the default configuration and the given
    /// completion backend.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the database
    /// cannot be initialized.
    pub async fn new(client: Arc<dyn CompletionApi>) -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config, client).await
    }

    /// Create a service with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized or its
    /// migrations fail.
    pub async fn from_config(config: Config, client: Arc<dyn CompletionApi>) -> Result<Self> {
        let db = Arc::new(Database::new(&config.database.path).await?);
        let config = Arc::new(config);
        let registry = Arc::new(PlatformRegistry::builtin());
        let event_bus = EventBus::new(100);

        let generation =
            GenerationService::new(client, Arc::clone(&config), event_bus.clone());
        let lifecycle = LifecycleService::new(
            Arc::clone(&db),
            Arc::clone(&registry),
            event_bus.clone(),
        );
        let timing = TimingService::new(
            Arc::clone(&db),
            Arc::clone(&registry),
            generation.clone(),
            Arc::clone(&config),
        );
        let analytics = AnalyticsService::new(Arc::clone(&db));

        Ok(Self {
            db,
            registry,
            lifecycle,
            generation,
            timing,
            analytics,
            event_bus,
        })
    }

    /// Access the database directly
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Access the platform constraint registry
    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Access the post lifecycle manager
    pub fn lifecycle(&self) -> &LifecycleService {
        &self.lifecycle
    }

    /// Access the AI content adapter
    pub fn generation(&self) -> &GenerationService {
        &self.generation
    }

    /// Access the optimal timing analyzer
    pub fn timing(&self) -> &TimingService {
        &self.timing
    }

    /// Access the engagement aggregator
    pub fn analytics(&self) -> &AnalyticsService {
        &self.analytics
    }

    /// Subscribe to service events
    pub fn subscribe(&self) -> events::EventReceiver {
        self.event_bus.subscribe()
    }

    /// Schedule a draft using a human-readable time expression such as
    /// "30m", "2h", or "tomorrow".
    pub async fn schedule_in(&self, post_id: &str, expression: &str) -> Result<Post> {
        let scheduled_at = crate::scheduling::parse_schedule(expression)?;
        self.lifecycle.schedule(post_id, scheduled_at).await
    }

    /// Schedule a draft at the timing analyzer's recommended time-of-day,
    /// taking its next strictly-future occurrence. This is the one place
    /// advisory timing output is adopted, and only on explicit request.
    pub async fn schedule_at_recommended(&self, post_id: &str) -> Result<Post> {
        let post = self
            .lifecycle
            .get(post_id)
            .await?
            .ok_or_else(|| crate::error::LifecycleError::NotFound(post_id.to_string()))?;

        let recommendation = self.timing.recommend(post.platform).await?;
        let scheduled_at = next_occurrence(Utc::now(), recommendation.best_time);

        self.lifecycle.schedule(post_id, scheduled_at).await
    }
}

/// The next strictly-future moment matching a time-of-day.
fn next_occurrence(now: DateTime<Utc>, time: chrono::NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(time).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}
