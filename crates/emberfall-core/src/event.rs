//! Domain event abstractions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name for dispatch routing.
    pub event_type: String,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Monotonically increasing sequence within the aggregate.
    pub sequence_number: i64,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name (used for handler routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}

/// Wire form of a domain event handed to the publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Serialized event payload.
    pub payload: serde_json::Value,
}

impl OutboundEvent {
    /// Converts a domain event into its wire form.
    #[must_use]
    pub fn from_event(event: &dyn DomainEvent) -> Self {
        Self {
            metadata: event.metadata().clone(),
            payload: event.to_payload(),
        }
    }
}

/// Handler invoked for each published event of a registered type.
pub type EventHandler = Arc<dyn Fn(&OutboundEvent) + Send + Sync>;

/// Fire-and-forget event delivery.
///
/// The domain never depends on delivery success: implementations log
/// and swallow handler failures.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a batch of events in order.
    async fn publish_all(&self, events: Vec<OutboundEvent>);

    /// Registers a handler for a given event type.
    fn register_handler(&self, event_type: &str, handler: EventHandler);
}
