//! Logging setup
//!
//! All log output goes to stderr so piped stdout stays clean. Format and
//! level are read from `POSTWISE_LOG_FORMAT` / `POSTWISE_LOG_LEVEL`, and an
//! embedder that manages its own flags can construct [`LoggingConfig`]
//! directly instead.
//!
//! ```no_run
//! use libpostwise::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "debug".to_string(), false).init();
//! ```

use std::io;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain lines for terminals and pipes
    #[default]
    Text,
    /// One JSON object per line, for log shippers
    Json,
    /// Multi-line colored output for development
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!(
                "unrecognized log format '{}' (expected text, json, or pretty)",
                other
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging settings applied once at startup.
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Read settings from `POSTWISE_LOG_FORMAT` and `POSTWISE_LOG_LEVEL`.
    /// Unset or unrecognized values fall back to text at info level.
    pub fn from_env() -> Self {
        let format = std::env::var("POSTWISE_LOG_FORMAT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let level = std::env::var("POSTWISE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            format,
            level,
            ..Default::default()
        }
    }

    /// Install the global subscriber.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber has already been installed.
    pub fn init(&self) {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_writer(io::stderr);

        match self.format {
            LogFormat::Json => builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .init(),
            LogFormat::Pretty => builder
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .init(),
            LogFormat::Text => builder.with_target(false).init(),
        }
    }

    /// `RUST_LOG` wins when set; otherwise the configured level, with
    /// `verbose` forcing debug.
    fn filter(&self) -> EnvFilter {
        let fallback = if self.verbose {
            "debug"
        } else {
            self.level.as_str()
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }
}

/// One-call setup: environment settings, text/info fallback.
pub fn init_default() {
    LoggingConfig::from_env().init();
}
