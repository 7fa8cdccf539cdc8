//! Best-effort user-facing notification sink.

use async_trait::async_trait;
use uuid::Uuid;

/// Delivers human-readable messages to players.
///
/// Delivery is best-effort: implementations must not surface failures
/// to the domain.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a message to a single player.
    async fn notify_player(&self, player_id: Uuid, message: &str);

    /// Sends the same message to every listed player.
    async fn notify_players(&self, player_ids: &[Uuid], message: &str) {
        for player_id in player_ids {
            self.notify_player(*player_id, message).await;
        }
    }
}
