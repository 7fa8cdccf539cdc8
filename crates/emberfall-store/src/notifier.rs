//! Notifier that writes player messages to the log.

use async_trait::async_trait;
use emberfall_core::notifier::Notifier;
use tracing::info;
use uuid::Uuid;

/// Logs every player notification instead of delivering it.
///
/// Stands in for a push channel; delivery is best-effort by contract,
/// so logging satisfies the interface.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify_player(&self, player_id: Uuid, message: &str) {
        info!(player_id = %player_id, message = %message, "player notification");
    }
}
