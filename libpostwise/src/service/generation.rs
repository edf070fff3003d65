//! AI content adapter
//!
//! Wraps the completion backend, enforces the structured-reply contract, and
//! synthesizes deterministic fallback output when the upstream model ignores
//! formatting instructions. A malformed reply is never an error here: only
//! the total absence of a reply surfaces as `GenerationError::Unavailable`.

use std::sync::Arc;

use chrono::NaiveTime;
use serde::Deserialize;
use tracing::{info, warn};

use super::events::{Event, EventBus};
use crate::completion::{CompletionApi, CompletionRequest};
use crate::error::GenerationError;
use crate::types::{AudienceProfile, ContentSuggestion, EngagementSample, Platform, Tone};
use crate::Config;

/// Hashtags used when a reply carries none we can parse.
const DEFAULT_HASHTAGS: [&str; 3] = ["#business", "#ai", "#growth"];

/// Engagement estimate assigned to synthesized suggestions (1-10 scale).
const FALLBACK_ESTIMATED_ENGAGEMENT: u8 = 7;

/// Confidence reported when timing analysis degrades to its builtin answer.
const FALLBACK_TIMING_CONFIDENCE: f64 = 0.75;

/// Whether a suggestion came from a parsed reply or was synthesized.
///
/// Kept crate-internal: callers always receive a valid suggestion, but the
/// distinction stays testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Generated<T> {
    Structured(T),
    Fallback(T),
}

impl<T> Generated<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Generated::Structured(value) | Generated::Fallback(value) => value,
        }
    }

    pub(crate) fn is_fallback(&self) -> bool {
        matches!(self, Generated::Fallback(_))
    }
}

/// Timing analysis produced by the advisor path. Consumed by the timing
/// analyzer, not exposed on the facade.
#[derive(Debug, Clone)]
pub struct TimingAnalysis {
    /// Recommended times in preference order.
    pub recommended_times: Vec<NaiveTime>,
    pub reasoning: String,
    /// 0.0 - 1.0.
    pub confidence: f64,
}

impl TimingAnalysis {
    fn fallback() -> Self {
        Self {
            recommended_times: vec![NaiveTime::from_hms_opt(10, 0, 0).unwrap()],
            reasoning: "General best practices for social media posting".to_string(),
            confidence: FALLBACK_TIMING_CONFIDENCE,
        }
    }
}

/// Shape requested from the completion service for content generation.
#[derive(Debug, Deserialize)]
struct SuggestionWire {
    title: String,
    content: String,
    #[serde(default)]
    hashtags: Vec<String>,
    #[serde(default)]
    estimated_engagement: Option<u8>,
}

/// Shape requested for timing analysis.
#[derive(Debug, Deserialize)]
struct TimingWire {
    recommended_times: Vec<String>,
    reasoning: String,
    confidence: f64,
}

/// AI content adapter service. Stateless between calls.
#[derive(Clone)]
pub struct GenerationService {
    client: Arc<dyn CompletionApi>,
    config: Arc<Config>,
    event_bus: EventBus,
}

impl GenerationService {
    pub fn new(client: Arc<dyn CompletionApi>, config: Arc<Config>, event_bus: EventBus) -> Self {
        Self {
            client,
            config,
            event_bus,
        }
    }

    /// Generate a content suggestion for a platform and tone.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Unavailable` only when the completion
    /// backend produces no reply within the configured timeout. A reply
    /// that ignores the requested structure degrades to a synthesized
    /// suggestion instead of failing.
    pub async fn generate_content(
        &self,
        prompt: &str,
        platform: Platform,
        tone: Tone,
    ) -> Result<ContentSuggestion, GenerationError> {
        let tagged = self.generate_content_tagged(prompt, platform, tone).await?;

        self.event_bus.emit(Event::ContentGenerated {
            platform: platform.to_string(),
            fallback: tagged.is_fallback(),
        });

        Ok(tagged.into_inner())
    }

    pub(crate) async fn generate_content_tagged(
        &self,
        prompt: &str,
        platform: Platform,
        tone: Tone,
    ) -> Result<Generated<ContentSuggestion>, GenerationError> {
        let request = self.build_content_request(prompt, platform, tone);
        let reply = self.complete_bounded(&request).await?;

        match serde_json::from_str::<SuggestionWire>(&reply) {
            Ok(wire) => {
                info!(platform = %platform, "completion reply parsed as structured suggestion");
                Ok(Generated::Structured(ContentSuggestion {
                    title: wire.title,
                    content: wire.content,
                    hashtags: if wire.hashtags.is_empty() {
                        default_hashtags()
                    } else {
                        wire.hashtags
                    },
                    platform,
                    tone,
                    estimated_engagement: wire
                        .estimated_engagement
                        .unwrap_or(FALLBACK_ESTIMATED_ENGAGEMENT),
                }))
            }
            Err(parse_err) => {
                warn!(
                    platform = %platform,
                    error = %parse_err,
                    "completion reply did not match requested shape, synthesizing fallback"
                );
                Ok(Generated::Fallback(ContentSuggestion {
                    title: truncated_title(prompt),
                    content: reply,
                    hashtags: default_hashtags(),
                    platform,
                    tone,
                    estimated_engagement: FALLBACK_ESTIMATED_ENGAGEMENT,
                }))
            }
        }
    }

    /// Analyze optimal posting times from an audience snapshot and history.
    ///
    /// Malformed replies degrade to a deterministic builtin analysis; only a
    /// transport failure is reported, and the timing analyzer (not the end
    /// caller) absorbs that too.
    pub async fn analyze_timing(
        &self,
        platform: Platform,
        audience: &AudienceProfile,
        history: &[EngagementSample],
    ) -> Result<TimingAnalysis, GenerationError> {
        let request = self.build_timing_request(platform, audience, history);
        let reply = self.complete_bounded(&request).await?;

        let analysis = match serde_json::from_str::<TimingWire>(&reply) {
            Ok(wire) => {
                let times: Vec<NaiveTime> = wire
                    .recommended_times
                    .iter()
                    .filter_map(|s| NaiveTime::parse_from_str(s, "%H:%M").ok())
                    .collect();

                if times.is_empty() {
                    warn!(platform = %platform, "timing reply had no parseable times, using fallback");
                    TimingAnalysis::fallback()
                } else {
                    TimingAnalysis {
                        recommended_times: times,
                        reasoning: wire.reasoning,
                        confidence: wire.confidence.clamp(0.0, 1.0),
                    }
                }
            }
            Err(_) => {
                warn!(platform = %platform, "timing reply not parseable, using fallback");
                TimingAnalysis::fallback()
            }
        };

        Ok(analysis)
    }

    /// Run a completion call under the configured timeout. A timeout is
    /// indistinguishable from a transport failure to callers.
    async fn complete_bounded(
        &self,
        request: &CompletionRequest,
    ) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.config.ai.timeout(), self.client.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Unavailable(format!(
                "completion call exceeded {}s timeout",
                self.config.ai.timeout_secs
            ))),
        }
    }

    fn build_content_request(
        &self,
        prompt: &str,
        platform: Platform,
        tone: Tone,
    ) -> CompletionRequest {
        let system = format!(
            "You are a social media expert creating content for {platform}. {framing} \
             Tone: {tone}. \
             Return JSON with: title, content, hashtags (array), estimated_engagement (1-10)",
            platform = platform,
            framing = platform_framing(platform),
            tone = tone,
        );

        CompletionRequest {
            system,
            user: prompt.to_string(),
            temperature: self.config.ai.temperature,
            max_tokens: self.config.ai.max_tokens,
        }
    }

    fn build_timing_request(
        &self,
        platform: Platform,
        audience: &AudienceProfile,
        history: &[EngagementSample],
    ) -> CompletionRequest {
        let avg_engagement = if history.is_empty() {
            0.0
        } else {
            history.iter().map(|s| s.engagement as f64).sum::<f64>() / history.len() as f64
        };

        let summary = serde_json::json!({
            "platform": platform,
            "audience_size": audience.size,
            "primary_timezone": audience.timezone,
            "age_group": audience.age_group,
            "recent_posts": history.len(),
            "avg_engagement": avg_engagement,
        });

        CompletionRequest {
            system: "You are a social media analytics expert. Analyze the data and recommend \
                     optimal posting times. Consider audience behavior, platform algorithms, and \
                     historical performance. Return JSON with: recommended_times (array of HH:MM), \
                     reasoning, confidence (0-1)"
                .to_string(),
            user: format!("Analyze this data: {}", summary),
            temperature: 0.3,
            max_tokens: 400,
        }
    }
}

fn platform_framing(platform: Platform) -> &'static str {
    match platform {
        Platform::Instagram => {
            "Generate visually appealing content with emojis and relevant hashtags. \
             Keep it engaging and authentic."
        }
        Platform::Linkedin => {
            "Create professional, business-focused content that provides value. \
             Include industry insights."
        }
        Platform::Twitter => {
            "Write concise, punchy content under 280 characters. \
             Make it shareable and trending-worthy."
        }
        Platform::Facebook => {
            "Create engaging, community-focused content that encourages interaction and sharing."
        }
    }
}

fn default_hashtags() -> Vec<String> {
    DEFAULT_HASHTAGS.iter().map(|s| s.to_string()).collect()
}

/// First 50 characters of the prompt plus an ellipsis marker.
fn truncated_title(prompt: &str) -> String {
    let head: String = prompt.chars().take(50).collect();
    format!("{}...", head)
}
