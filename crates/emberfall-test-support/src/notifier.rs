//! Test notifier — records every delivered message.

use std::sync::Mutex;

use async_trait::async_trait;
use emberfall_core::notifier::Notifier;
use uuid::Uuid;

/// A notifier that records `(player_id, message)` pairs for assertion.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(Uuid, String)>>,
}

impl RecordingNotifier {
    /// Create an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every delivered message, in order.
    pub fn messages(&self) -> Vec<(Uuid, String)> {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_player(&self, player_id: Uuid, message: &str) {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((player_id, message.to_owned()));
    }
}
