//! Engagement aggregator
//!
//! Dashboard-level summary statistics derived from the post collection.
//! Pure functions over a slice of posts, recomputed on every read; the
//! dashboard is low-QPS so there is no caching layer.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::PostQuery;
use crate::types::{Platform, Post, PostStatus};
use crate::{Database, Result};

/// Totals and averages over the posted portion of the collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngagementSummary {
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    pub total_reach: i64,
    pub posted_count: usize,
    /// (likes + comments + shares) / posted_count; 0 when nothing posted.
    pub avg_engagement_per_post: f64,
}

/// Per-status tallies across the whole collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub draft: usize,
    pub scheduled: usize,
    pub posted: usize,
    pub failed: usize,
}

/// Aggregates for one platform's posted entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlatformEngagement {
    pub posts_count: usize,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    pub total_reach: i64,
    pub avg_engagement: f64,
    /// 100 * interactions / reach, with a floor of 1 on reach.
    pub engagement_rate: f64,
}

/// Summarize the posted portion of a post collection.
///
/// Draft, scheduled, and failed posts contribute nothing. The average is
/// defined as 0 for an empty posted set; that is policy, not an error.
pub fn summarize(posts: &[Post]) -> EngagementSummary {
    let mut summary = EngagementSummary::default();

    for post in posts.iter().filter(|p| p.status == PostStatus::Posted) {
        summary.total_likes += post.engagement.likes;
        summary.total_comments += post.engagement.comments;
        summary.total_shares += post.engagement.shares;
        summary.total_reach += post.engagement.reach;
        summary.posted_count += 1;
    }

    if summary.posted_count > 0 {
        let interactions = summary.total_likes + summary.total_comments + summary.total_shares;
        summary.avg_engagement_per_post = interactions as f64 / summary.posted_count as f64;
    }

    summary
}

/// The `n` posted entries with the most interactions, descending; ties go
/// to the most recently posted.
pub fn top_performers(posts: &[Post], n: usize) -> Vec<Post> {
    let mut posted: Vec<Post> = posts
        .iter()
        .filter(|p| p.status == PostStatus::Posted)
        .cloned()
        .collect();

    posted.sort_by(|a, b| {
        b.engagement
            .total()
            .cmp(&a.engagement.total())
            .then(b.posted_at.cmp(&a.posted_at))
    });

    posted.truncate(n);
    posted
}

/// Tally posts by status.
pub fn status_counts(posts: &[Post]) -> StatusCounts {
    let mut counts = StatusCounts {
        total: posts.len(),
        ..Default::default()
    };

    for post in posts {
        match post.status {
            PostStatus::Draft => counts.draft += 1,
            PostStatus::Scheduled => counts.scheduled += 1,
            PostStatus::Posted => counts.posted += 1,
            PostStatus::Failed => counts.failed += 1,
        }
    }

    counts
}

/// Per-platform aggregates over posted entries. Platforms with no posted
/// entries are absent from the map.
pub fn platform_breakdown(posts: &[Post]) -> HashMap<Platform, PlatformEngagement> {
    let mut breakdown: HashMap<Platform, PlatformEngagement> = HashMap::new();

    for post in posts.iter().filter(|p| p.status == PostStatus::Posted) {
        let entry = breakdown.entry(post.platform).or_default();
        entry.posts_count += 1;
        entry.total_likes += post.engagement.likes;
        entry.total_comments += post.engagement.comments;
        entry.total_shares += post.engagement.shares;
        entry.total_reach += post.engagement.reach;
    }

    for entry in breakdown.values_mut() {
        let interactions = entry.total_likes + entry.total_comments + entry.total_shares;
        entry.avg_engagement = interactions as f64 / entry.posts_count as f64;
        entry.engagement_rate = 100.0 * interactions as f64 / entry.total_reach.max(1) as f64;
    }

    breakdown
}

/// Store-backed wrapper around the pure aggregation layer.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<Database>,
}

impl AnalyticsService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn summary(&self) -> Result<EngagementSummary> {
        Ok(summarize(&self.all_posts().await?))
    }

    pub async fn top_performers(&self, n: usize) -> Result<Vec<Post>> {
        Ok(top_performers(&self.all_posts().await?, n))
    }

    pub async fn status_counts(&self) -> Result<StatusCounts> {
        Ok(status_counts(&self.all_posts().await?))
    }

    pub async fn platform_breakdown(&self) -> Result<HashMap<Platform, PlatformEngagement>> {
        Ok(platform_breakdown(&self.all_posts().await?))
    }

    async fn all_posts(&self) -> Result<Vec<Post>> {
        self.db.list_posts(&PostQuery::default()).await
    }
}
