//! Event system for observability
//!
//! An in-process event bus distributing lifecycle and generation events to
//! subscribers without blocking operations.
//!
//! # Non-Blocking Behavior
//!
//! If no subscribers exist, events are dropped immediately without
//! allocation or blocking. Subscribers can lag without blocking emitters.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Event bus for distributing events
///
/// Uses a broadcast channel to distribute events to multiple subscribers.
/// Events are dropped if no subscribers exist.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the specified per-subscriber capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events
    ///
    /// Returns a receiver that will receive all events emitted after
    /// subscription. Multiple subscribers are supported.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Non-blocking. If no subscribers exist, the event is dropped. Lagging
    /// subscribers lose the oldest events first.
    pub fn emit(&self, event: Event) {
        // send() returns Err if no receivers exist, which is fine
        let _ = self.sender.send(event);
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Events emitted by services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A draft was created
    DraftCreated { post_id: String, platform: String },

    /// A draft passed validation and was scheduled
    PostScheduled { post_id: String, scheduled_at: i64 },

    /// A scheduled post went out
    PostPublished { post_id: String, posted_at: i64 },

    /// Delivery of a scheduled post failed
    PostFailed { post_id: String, reason: String },

    /// A failed post was returned to draft
    PostResubmitted { post_id: String },

    /// A posted post's engagement snapshot was replaced
    EngagementRecorded { post_id: String },

    /// The content adapter produced a suggestion. `fallback` marks the
    /// degrade path where the upstream reply could not be parsed.
    ContentGenerated { platform: String, fallback: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(Event::PostScheduled {
            post_id: "post-1".to_string(),
            scheduled_at: 1_900_000_000,
        });

        match receiver.recv().await.unwrap() {
            Event::PostScheduled {
                post_id,
                scheduled_at,
            } => {
                assert_eq!(post_id, "post-1");
                assert_eq!(scheduled_at, 1_900_000_000);
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.emit(Event::PostFailed {
            post_id: "post-2".to_string(),
            reason: "rate limited".to_string(),
        });

        assert!(matches!(
            receiver1.recv().await.unwrap(),
            Event::PostFailed { .. }
        ));
        assert!(matches!(
            receiver2.recv().await.unwrap(),
            Event::PostFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let event_bus = EventBus::new(10);

        // Emit with no subscribers - should not panic or block
        event_bus.emit(Event::PostResubmitted {
            post_id: "post-3".to_string(),
        });

        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_serialization() {
        let event = Event::ContentGenerated {
            platform: "twitter".to_string(),
            fallback: true,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("content_generated"));
        assert!(json.contains("twitter"));

        let deserialized: Event = serde_json::from_str(&json).unwrap();
        match deserialized {
            Event::ContentGenerated { platform, fallback } => {
                assert_eq!(platform, "twitter");
                assert!(fallback);
            }
            _ => panic!("Deserialization failed"),
        }
    }
}
