//! Mock completion backend for testing
//!
//! A configurable backend that can return structured JSON, free text, or a
//! transport failure, with an optional delay to exercise timeout handling.
//! Lives outside `#[cfg(test)]` so integration tests can drive the full
//! service stack without a real completion endpoint.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::{CompletionApi, CompletionRequest};
use crate::error::GenerationError;

/// What the mock should answer with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A reply that parses as the requested structure
    Structured(serde_json::Value),
    /// Free text that ignores the shape hint
    Freeform(String),
    /// No reply at all (transport failure)
    Unavailable(String),
}

/// Configuration for mock backend behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub name: String,
    pub reply: MockReply,
    /// Delay before answering (simulates network latency)
    pub delay: Duration,
    /// Number of times complete has been called
    pub call_count: Arc<Mutex<usize>>,
    /// Requests that have been made (for verification)
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            reply: MockReply::Freeform(String::new()),
            delay: Duration::from_millis(0),
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock completion backend
pub struct MockCompletion {
    config: MockConfig,
}

impl MockCompletion {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A backend that answers with well-formed JSON
    pub fn structured(value: serde_json::Value) -> Self {
        Self::new(MockConfig {
            reply: MockReply::Structured(value),
            ..Default::default()
        })
    }

    /// A backend that ignores the shape hint and answers with free text
    pub fn freeform(text: &str) -> Self {
        Self::new(MockConfig {
            reply: MockReply::Freeform(text.to_string()),
            ..Default::default()
        })
    }

    /// A backend that fails at the transport level
    pub fn unavailable(error: &str) -> Self {
        Self::new(MockConfig {
            reply: MockReply::Unavailable(error.to_string()),
            ..Default::default()
        })
    }

    /// Add a delay before each reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *self.config.call_count.lock().unwrap()
    }

    /// Get all requests that were made
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.config.requests.lock().unwrap().clone()
    }

    /// Shared handles for inspecting calls after the mock has been moved
    /// into an `Arc<dyn CompletionApi>`.
    pub fn probes(&self) -> (Arc<Mutex<usize>>, Arc<Mutex<Vec<CompletionRequest>>>) {
        (
            Arc::clone(&self.config.call_count),
            Arc::clone(&self.config.requests),
        )
    }
}

#[async_trait]
impl CompletionApi for MockCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        *self.config.call_count.lock().unwrap() += 1;
        self.config.requests.lock().unwrap().push(request.clone());

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        match &self.config.reply {
            MockReply::Structured(value) => Ok(value.to_string()),
            MockReply::Freeform(text) => Ok(text.clone()),
            MockReply::Unavailable(error) => Err(GenerationError::Unavailable(error.clone())),
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
