//! Optimal timing analyzer
//!
//! Produces a ranked ordering of candidate post times for a platform from
//! three tiers: locally observed engagement history when enough posted
//! samples exist, otherwise the AI advisor, otherwise the registry's static
//! windows. Output is advisory only; nothing here mutates a post.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::generation::GenerationService;
use crate::registry::PlatformRegistry;
use crate::types::{EngagementSample, Platform, TimingRecommendation};
use crate::{Config, Database, Result};

/// Score assigned to registry-window candidates, mirroring the lowered
/// confidence of the last-resort tier.
const WINDOW_SCORE: u8 = 60;

/// Which tier produced a recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Derived from observed engagement history
    History,
    /// Provided by the AI advisor
    Advisor,
    /// Registry's static best-time windows
    PlatformDefaults,
}

/// One candidate posting time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeCandidate {
    pub time: NaiveTime,
    /// 0-100.
    pub score: u8,
    /// Posted samples backing this candidate (history tier only).
    pub samples: usize,
}

/// Ranked analysis for one platform.
#[derive(Debug, Clone)]
pub struct TimingReport {
    pub platform: Platform,
    /// Best first.
    pub candidates: Vec<TimeCandidate>,
    pub reasoning: String,
    pub source: RecommendationSource,
}

#[derive(Clone)]
pub struct TimingService {
    db: Arc<Database>,
    registry: Arc<PlatformRegistry>,
    generation: GenerationService,
    config: Arc<Config>,
}

impl TimingService {
    pub fn new(
        db: Arc<Database>,
        registry: Arc<PlatformRegistry>,
        generation: GenerationService,
        config: Arc<Config>,
    ) -> Self {
        Self {
            db,
            registry,
            generation,
            config,
        }
    }

    /// Recommend the single best time to post on a platform.
    pub async fn recommend(&self, platform: Platform) -> Result<TimingRecommendation> {
        let report = self.analyze(platform).await?;
        let best = report.candidates.first().ok_or_else(|| {
            crate::PostwiseError::InvalidInput(format!("no timing candidates for {}", platform))
        })?;

        Ok(TimingRecommendation {
            best_time: best.time,
            platform,
            expected_engagement_score: best.score,
            reasoning: report.reasoning,
        })
    }

    /// Full ranked analysis for a platform.
    pub async fn analyze(&self, platform: Platform) -> Result<TimingReport> {
        let posted = self.db.posted_posts_for_platform(platform).await?;
        let samples: Vec<EngagementSample> = posted
            .iter()
            .filter_map(|post| {
                post.posted_at.map(|posted_at| EngagementSample {
                    posted_at,
                    engagement: post.engagement.total(),
                })
            })
            .collect();

        if !samples.is_empty() && samples.len() >= self.config.timing.min_history_samples {
            debug!(platform = %platform, samples = samples.len(), "ranking from history");
            return Ok(self.rank_from_history(platform, &samples));
        }

        match self
            .generation
            .analyze_timing(platform, &self.config.audience.clone().into(), &samples)
            .await
        {
            Ok(analysis) => {
                let score = (analysis.confidence * 100.0).round().clamp(0.0, 100.0) as u8;
                Ok(TimingReport {
                    platform,
                    candidates: analysis
                        .recommended_times
                        .into_iter()
                        .map(|time| TimeCandidate {
                            time,
                            score,
                            samples: 0,
                        })
                        .collect(),
                    reasoning: analysis.reasoning,
                    source: RecommendationSource::Advisor,
                })
            }
            Err(e) => {
                warn!(platform = %platform, error = %e, "advisor unavailable, using platform defaults");
                let profile = self.registry.profile(platform)?;
                Ok(TimingReport {
                    platform,
                    candidates: profile
                        .best_time_windows
                        .iter()
                        .map(|&time| TimeCandidate {
                            time,
                            score: WINDOW_SCORE,
                            samples: 0,
                        })
                        .collect(),
                    reasoning: format!("Canonical posting windows for {}", platform),
                    source: RecommendationSource::PlatformDefaults,
                })
            }
        }
    }

    /// Bucket average engagement per UTC hour-of-day and rank descending,
    /// ties broken by earlier hour. Scores express how far a bucket sits
    /// above the overall mean: 50 for a flat profile, saturating at 100.
    fn rank_from_history(&self, platform: Platform, samples: &[EngagementSample]) -> TimingReport {
        let mut buckets: [(i64, usize); 24] = [(0, 0); 24];
        for sample in samples {
            let hour = DateTime::<Utc>::from_timestamp(sample.posted_at, 0)
                .map(|dt| dt.hour() as usize)
                .unwrap_or(0);
            buckets[hour].0 += sample.engagement;
            buckets[hour].1 += 1;
        }

        let overall_avg = samples.iter().map(|s| s.engagement as f64).sum::<f64>()
            / samples.len() as f64;

        let mut candidates: Vec<(usize, f64, usize)> = buckets
            .iter()
            .enumerate()
            .filter(|(_, (_, count))| *count > 0)
            .map(|(hour, (total, count))| (hour, *total as f64 / *count as f64, *count))
            .collect();

        // Rank by average descending; ties go to the earlier hour
        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let candidates: Vec<TimeCandidate> = candidates
            .into_iter()
            .map(|(hour, avg, count)| TimeCandidate {
                time: NaiveTime::from_hms_opt(hour as u32, 0, 0).unwrap(),
                score: bucket_score(avg, overall_avg),
                samples: count,
            })
            .collect();

        let best = &candidates[0];
        let reasoning = format!(
            "Averaged engagement across {} posted updates on {}; {} leads with {} samples",
            samples.len(),
            platform,
            best.time.format("%H:%M"),
            best.samples,
        );

        TimingReport {
            platform,
            candidates,
            reasoning,
            source: RecommendationSource::History,
        }
    }
}

fn bucket_score(bucket_avg: f64, overall_avg: f64) -> u8 {
    if overall_avg <= 0.0 {
        return 50;
    }
    (50.0 * bucket_avg / overall_avg).round().min(100.0) as u8
}
