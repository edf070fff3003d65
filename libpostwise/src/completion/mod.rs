//! Completion backend abstraction
//!
//! The text-completion service is an external, untrusted collaborator: it
//! accepts a role-tagged prompt carrying a response-shape hint and returns
//! free text that may or may not match the hint. Everything above this seam
//! validates replies and falls back rather than trusting them.
//!
//! # Examples
//!
//! ```no_run
//! use libpostwise::completion::{CompletionApi, CompletionRequest};
//!
//! # async fn example(backend: &dyn CompletionApi) -> Result<(), libpostwise::error::GenerationError> {
//! let request = CompletionRequest {
//!     system: "Reply with JSON: {\"title\": ..., \"content\": ...}".to_string(),
//!     user: "Announce our spring sale".to_string(),
//!     temperature: 0.7,
//!     max_tokens: 500,
//! };
//!
//! let reply = backend.complete(&request).await?;
//! println!("raw reply: {}", reply);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::GenerationError;

// Mock backend is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// A single role-tagged completion request.
///
/// `system` carries the framing and the response-shape hint; `user` carries
/// the caller's prompt or data summary.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text-completion backend trait.
///
/// Implementations are stateless between calls. The only failure mode is
/// transport-level: a reply that arrives is always `Ok`, however malformed
/// its content.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Send a completion request and return the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Unavailable` when no reply could be
    /// obtained at all (connection failure, upstream outage).
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;

    /// Backend name for logging (e.g. "openai", "mock").
    fn name(&self) -> &str;
}
