//! Schedule-string parsing
//!
//! Turns human-readable time expressions into concrete schedule timestamps.

use crate::{PostwiseError, Result};
use chrono::{DateTime, Duration, Utc};

/// Parse a schedule string into a DateTime
///
/// Supports multiple formats:
/// - Relative durations: "1h", "30m", "2d"
/// - Natural language: "tomorrow", "next friday 10am"
///
/// # Errors
///
/// Returns an error if the time format is invalid or cannot be parsed.
pub fn parse_schedule(input: &str) -> Result<DateTime<Utc>> {
    if input.is_empty() {
        return Err(PostwiseError::InvalidInput(
            "Schedule string cannot be empty".to_string(),
        ));
    }

    // Try duration parsing
    if let Ok(duration) = parse_duration(input) {
        return Ok(Utc::now() + duration);
    }

    // Try natural language parsing
    if let Ok(dt) = parse_natural_language(input) {
        return Ok(dt);
    }

    Err(PostwiseError::InvalidInput(format!(
        "Could not parse schedule string: {}",
        input
    )))
}

/// Parse a duration string into a chrono::Duration
fn parse_duration(input: &str) -> Result<Duration> {
    if let Ok(std_duration) = humantime::parse_duration(input) {
        let seconds = std_duration.as_secs() as i64;
        return Duration::try_seconds(seconds)
            .ok_or_else(|| PostwiseError::InvalidInput("Duration out of range".to_string()));
    }

    Err(PostwiseError::InvalidInput(format!(
        "Could not parse duration: {}",
        input
    )))
}

/// Parse natural language time expression
fn parse_natural_language(input: &str) -> Result<DateTime<Utc>> {
    chrono_english::parse_date_string(input, Utc::now(), chrono_english::Dialect::Us)
        .map_err(|e| PostwiseError::InvalidInput(format!("Could not parse time: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_minutes() {
        let result = parse_schedule("30m");
        assert!(result.is_ok());

        let scheduled_time = result.unwrap();
        let diff = (scheduled_time - Utc::now()).num_minutes();
        assert!(
            (29..=31).contains(&diff),
            "Expected ~30 minutes, got {}",
            diff
        );
    }

    #[test]
    fn test_parse_duration_hours() {
        let result = parse_schedule("2h");
        assert!(result.is_ok());

        let diff = (result.unwrap() - Utc::now()).num_minutes();
        assert!(
            (119..=121).contains(&diff),
            "Expected ~120 minutes, got {}",
            diff
        );
    }

    #[test]
    fn test_parse_duration_with_space() {
        let result = parse_schedule("1 hour");
        assert!(result.is_ok());

        let diff = (result.unwrap() - Utc::now()).num_minutes();
        assert!((59..=61).contains(&diff), "Expected ~60 minutes, got {}", diff);
    }

    #[test]
    fn test_parse_tomorrow() {
        let result = parse_schedule("tomorrow");
        assert!(result.is_ok());

        let diff = (result.unwrap() - Utc::now()).num_hours();
        // Allow tolerance: "tomorrow" resolves to a fixed hour of day
        assert!((20..=28).contains(&diff), "Expected ~24 hours, got {}", diff);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(parse_schedule("").is_err());
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(parse_schedule("not a time").is_err());
    }
}
