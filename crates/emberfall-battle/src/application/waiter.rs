//! Player action synchronization.
//!
//! The battle loop parks on a waiter entry while a player decides; the
//! request handler completes the entry once the action has been
//! applied. Entries are keyed by battle and player so concurrent
//! battles never cross-signal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

/// Gauge snapshot over the waiter's internal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaiterStatistics {
    /// Entries a loop is currently blocked on.
    pub waiting: usize,
    /// Entries registered but not yet awaited or completed.
    pub registered: usize,
    /// Total entries tracked.
    pub total_tracked: usize,
}

#[derive(Debug)]
struct WaitEntry {
    notify: Arc<Notify>,
    completed: bool,
    awaited: bool,
}

/// Coordinates the battle loop with asynchronous player input.
#[derive(Debug, Default)]
pub struct PlayerActionWaiter {
    entries: Mutex<HashMap<(Uuid, Uuid), WaitEntry>>,
}

impl PlayerActionWaiter {
    /// Creates an empty waiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pending entry for `player_id` in `battle_id`.
    /// Completions that arrive before the loop starts waiting are not
    /// lost; the subsequent wait returns immediately.
    pub async fn register(&self, battle_id: Uuid, player_id: Uuid) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            (battle_id, player_id),
            WaitEntry {
                notify: Arc::new(Notify::new()),
                completed: false,
                awaited: false,
            },
        );
    }

    /// Blocks until the player's action is completed or `timeout`
    /// elapses. Returns `true` when the action arrived in time. The
    /// entry is removed on return.
    pub async fn wait_for_action(
        &self,
        battle_id: Uuid,
        player_id: Uuid,
        timeout: Duration,
    ) -> bool {
        let key = (battle_id, player_id);
        let notify = {
            let mut entries = self.entries.lock().await;
            match entries.get_mut(&key) {
                Some(entry) if entry.completed => {
                    entries.remove(&key);
                    return true;
                }
                Some(entry) => {
                    entry.awaited = true;
                    Arc::clone(&entry.notify)
                }
                // Not registered; nothing to wait on.
                None => return false,
            }
        };

        let _ = tokio::time::timeout(timeout, notify.notified()).await;

        // Distinguish a real completion from a timeout or a battle
        // cancellation by re-reading the entry's flag.
        self.entries
            .lock()
            .await
            .remove(&key)
            .is_some_and(|entry| entry.completed)
    }

    /// Marks the player's pending action as completed and wakes the
    /// loop if it is waiting. Returns `false` when no entry exists,
    /// which means the loop is not expecting input from this player.
    pub async fn complete_action(&self, battle_id: Uuid, player_id: Uuid) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(&(battle_id, player_id)) {
            Some(entry) => {
                entry.completed = true;
                entry.notify.notify_one();
                true
            }
            None => false,
        }
    }

    /// Drops every entry belonging to `battle_id`, waking any waiters
    /// so an aborted battle never leaves a loop parked forever.
    pub async fn cancel_battle(&self, battle_id: Uuid) {
        let mut entries = self.entries.lock().await;
        entries.retain(|(entry_battle, _), entry| {
            if *entry_battle == battle_id {
                entry.notify.notify_one();
                false
            } else {
                true
            }
        });
    }

    /// Current gauge values.
    pub async fn statistics(&self) -> WaiterStatistics {
        let entries = self.entries.lock().await;
        let waiting = entries.values().filter(|e| e.awaited && !e.completed).count();
        WaiterStatistics {
            waiting,
            registered: entries.values().filter(|e| !e.awaited && !e.completed).count(),
            total_tracked: entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_returns_true_when_action_completes_first() {
        let waiter = PlayerActionWaiter::new();
        let battle_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();

        waiter.register(battle_id, player_id).await;
        assert!(waiter.complete_action(battle_id, player_id).await);

        let arrived = waiter
            .wait_for_action(battle_id, player_id, Duration::from_millis(100))
            .await;
        assert!(arrived);
    }

    #[tokio::test]
    async fn test_wait_returns_true_when_completion_arrives_while_waiting() {
        let waiter = Arc::new(PlayerActionWaiter::new());
        let battle_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();

        waiter.register(battle_id, player_id).await;

        let signaller = Arc::clone(&waiter);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            signaller.complete_action(battle_id, player_id).await
        });

        let arrived = waiter
            .wait_for_action(battle_id, player_id, Duration::from_secs(5))
            .await;
        assert!(arrived);
        assert!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_times_out_without_completion() {
        let waiter = PlayerActionWaiter::new();
        let battle_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();

        waiter.register(battle_id, player_id).await;

        let arrived = waiter
            .wait_for_action(battle_id, player_id, Duration::from_millis(100))
            .await;
        assert!(!arrived);

        let stats = waiter.statistics().await;
        assert_eq!(stats.total_tracked, 0);
    }

    #[tokio::test]
    async fn test_complete_without_registration_is_rejected() {
        let waiter = PlayerActionWaiter::new();
        assert!(!waiter.complete_action(Uuid::new_v4(), Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_cancel_battle_wakes_parked_waiters() {
        let waiter = Arc::new(PlayerActionWaiter::new());
        let battle_id = Uuid::new_v4();
        let player_id = Uuid::new_v4();

        waiter.register(battle_id, player_id).await;

        let canceller = Arc::clone(&waiter);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel_battle(battle_id).await;
        });

        // The wake is not a completion, so the wait reports no action.
        let arrived = waiter
            .wait_for_action(battle_id, player_id, Duration::from_secs(5))
            .await;
        assert!(!arrived);

        let stats = waiter.statistics().await;
        assert_eq!(stats.total_tracked, 0);
    }

    #[tokio::test]
    async fn test_statistics_distinguish_registered_from_waiting() {
        let waiter = Arc::new(PlayerActionWaiter::new());
        let battle_id = Uuid::new_v4();
        let parked = Uuid::new_v4();
        let idle = Uuid::new_v4();

        waiter.register(battle_id, parked).await;
        waiter.register(battle_id, idle).await;

        let background = Arc::clone(&waiter);
        let handle = tokio::spawn(async move {
            background
                .wait_for_action(battle_id, parked, Duration::from_millis(200))
                .await
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stats = waiter.statistics().await;
        assert_eq!(stats.waiting, 1);
        assert_eq!(stats.registered, 1);
        assert_eq!(stats.total_tracked, 2);

        assert!(!handle.await.unwrap());
    }
}
