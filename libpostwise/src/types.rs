//! Core types for Postwise

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platforms the scheduler can publish to. Closed set: adding a platform is
/// a deployment, not a runtime operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Linkedin,
    Twitter,
    Facebook,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Instagram,
        Platform::Linkedin,
        Platform::Twitter,
        Platform::Facebook,
    ];

    /// Parse a lowercase platform name. Returns `None` for anything outside
    /// the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "instagram" => Some(Self::Instagram),
            "linkedin" => Some(Self::Linkedin),
            "twitter" => Some(Self::Twitter),
            "facebook" => Some(Self::Facebook),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Linkedin => "linkedin",
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Posted,
    Failed,
}

impl PostStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "scheduled" => Some(Self::Scheduled),
            "posted" => Some(Self::Posted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Posted => "posted",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cumulative interaction counters as reported by a platform.
///
/// Fields are signed so that a malformed upstream report is representable
/// and can be rejected with `NegativeValue` instead of wrapping.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Engagement {
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub reach: i64,
}

impl Engagement {
    pub fn new(likes: i64, comments: i64, shares: i64, reach: i64) -> Self {
        Self {
            likes,
            comments,
            shares,
            reach,
        }
    }

    /// Interaction total used for ranking and averages. Reach is exposure,
    /// not interaction, so it is excluded.
    pub fn total(&self) -> i64 {
        self.likes + self.comments + self.shares
    }

    /// Name of the first negative field, if any.
    pub fn first_negative(&self) -> Option<(&'static str, i64)> {
        [
            ("likes", self.likes),
            ("comments", self.comments),
            ("shares", self.shares),
            ("reach", self.reach),
        ]
        .into_iter()
        .find(|(_, value)| *value < 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub platform: Platform,
    pub content: String,
    /// Opaque reference to an external asset. Never dereferenced here.
    pub media_ref: Option<String>,
    pub status: PostStatus,
    pub scheduled_at: Option<i64>,
    pub posted_at: Option<i64>,
    /// Delivery failure reason, retained for observability only.
    pub failure_reason: Option<String>,
    pub engagement: Engagement,
    pub created_at: i64,
}

impl Post {
    /// Create a new draft. Length validation is deferred to scheduling so
    /// drafts can be iterated on freely.
    pub fn new(platform: Platform, content: String, media_ref: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            platform,
            content,
            media_ref,
            status: PostStatus::Draft,
            scheduled_at: None,
            posted_at: None,
            failure_reason: None,
            engagement: Engagement::default(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Requested voice for generated content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    Friendly,
    Authoritative,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Friendly => "friendly",
            Self::Authoritative => "authoritative",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One generated piece of content. Ephemeral: produced per call, persisted
/// only if the caller turns it into a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSuggestion {
    pub title: String,
    pub content: String,
    pub hashtags: Vec<String>,
    pub platform: Platform,
    pub tone: Tone,
    /// Self-reported engagement estimate on a 1-10 scale.
    pub estimated_engagement: u8,
}

/// Recommended time-of-day to publish on a platform. Advisory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingRecommendation {
    pub best_time: NaiveTime,
    pub platform: Platform,
    /// 0-100.
    pub expected_engagement_score: u8,
    pub reasoning: String,
}

/// Audience snapshot handed to the timing analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceProfile {
    pub size: u64,
    pub timezone: String,
    pub age_group: String,
}

/// Historical datapoint for timing analysis: when a post went out and how
/// much interaction it drew.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngagementSample {
    pub posted_at: i64,
    pub engagement: i64,
}
