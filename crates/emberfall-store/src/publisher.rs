//! In-process event delivery.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use emberfall_core::event::{EventHandler, EventPublisher, OutboundEvent};
use tracing::debug;

/// Event publisher that dispatches to registered in-process handlers
/// and keeps the published history for inspection.
#[derive(Default)]
pub struct InMemoryEventPublisher {
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
    published: RwLock<Vec<OutboundEvent>>,
}

impl InMemoryEventPublisher {
    /// Creates a publisher with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event published so far, in order.
    #[must_use]
    pub fn published_events(&self) -> Vec<OutboundEvent> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish_all(&self, events: Vec<OutboundEvent>) {
        for event in &events {
            debug!(
                event_type = %event.metadata.event_type,
                aggregate_id = %event.metadata.aggregate_id,
                "publishing event"
            );
            let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
            if let Some(registered) = handlers.get(&event.metadata.event_type) {
                for handler in registered {
                    handler(event);
                }
            }
        }
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .extend(events);
    }

    fn register_handler(&self, event_type: &str, handler: EventHandler) {
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(event_type.to_owned())
            .or_default()
            .push(handler);
    }
}

impl std::fmt::Debug for InMemoryEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventPublisher").finish_non_exhaustive()
    }
}
