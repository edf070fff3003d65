//! Error types for Postwise

use thiserror::Error;

use crate::types::PostStatus;

pub type Result<T> = std::result::Result<T, PostwiseError>;

#[derive(Error, Debug)]
pub enum PostwiseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),
}

/// Validation and state-machine failures surfaced by the lifecycle manager.
///
/// These are caller errors, never retried automatically. Persistence
/// failures are not folded in here; they propagate as [`DbError`].
#[derive(Error, Debug, Clone)]
pub enum LifecycleError {
    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("Content length ({length} characters) exceeds {platform} limit of {max} characters")]
    ContentTooLong {
        platform: String,
        length: usize,
        max: usize,
    },

    #[error("Scheduled time {scheduled_at} is not in the future")]
    PastSchedule { scheduled_at: i64 },

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Cannot {action} post {post_id} while {from}")]
    InvalidTransition {
        post_id: String,
        from: PostStatus,
        action: &'static str,
    },

    #[error("Engagement field {field} cannot be negative (got {value})")]
    NegativeValue { field: &'static str, value: i64 },
}

#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("Completion service unavailable: {0}")]
    Unavailable(String),
}
