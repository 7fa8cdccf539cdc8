//! Per-battle turn loop.
//!
//! Each running battle is driven by exactly one tokio task, so all
//! writes to a battle are serialized through its loop. The loop
//! alternates between processing turns through the battle service and
//! parking on the player-action waiter when a player must act.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use emberfall_core::error::DomainError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::battle_service::{BattleService, TurnOutcome};
use crate::domain::battle::BattleState;
use crate::domain::combat_state::ParticipantKey;

/// Consecutive turn failures tolerated before a loop gives up.
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Tuning knobs for battle loops.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// How long a player may take to submit an action.
    pub player_action_timeout: Duration,
    /// Pacing delay between consecutive turns.
    pub inter_turn_delay: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            player_action_timeout: Duration::from_secs(30),
            inter_turn_delay: Duration::from_millis(100),
        }
    }
}

/// Manages the lifecycle of per-battle loop tasks.
pub struct BattleLoopService {
    service: Arc<BattleService>,
    config: LoopConfig,
    running: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl BattleLoopService {
    /// Creates a loop service driving battles through `service`.
    #[must_use]
    pub fn new(service: Arc<BattleService>, config: LoopConfig) -> Self {
        Self {
            service,
            config,
            running: Mutex::new(HashMap::new()),
        }
    }

    /// Spawns the loop task for `battle_id`.
    ///
    /// # Errors
    ///
    /// Returns `BattleLoopAlreadyRunning` when a task for this battle
    /// already exists, `BattleNotFound` for an unknown battle, and
    /// `BattleNotInProgress` for a battle outside its active phase.
    pub async fn start_battle_loop(self: &Arc<Self>, battle_id: Uuid) -> Result<(), DomainError> {
        let status = self.service.battle_status(battle_id).await?;
        if status.state != BattleState::InProgress {
            return Err(DomainError::BattleNotInProgress { battle_id });
        }

        let mut running = self.running.lock().await;
        if running.contains_key(&battle_id) {
            return Err(DomainError::BattleLoopAlreadyRunning(battle_id));
        }

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            this.run_loop(battle_id).await;
            this.running.lock().await.remove(&battle_id);
            this.service.cleanup_battle(battle_id).await;
        });
        running.insert(battle_id, handle);
        info!(battle_id = %battle_id, "battle loop started");
        Ok(())
    }

    /// Aborts the loop task for `battle_id`, if one is running, and
    /// releases the battle's resources.
    pub async fn stop_battle_loop(&self, battle_id: Uuid) {
        let handle = self.running.lock().await.remove(&battle_id);
        if let Some(handle) = handle {
            handle.abort();
            info!(battle_id = %battle_id, "battle loop stopped");
        }
        self.service.cleanup_battle(battle_id).await;
    }

    /// Whether a loop task exists for `battle_id`.
    pub async fn is_battle_loop_running(&self, battle_id: Uuid) -> bool {
        self.running.lock().await.contains_key(&battle_id)
    }

    /// Number of currently running loops.
    pub async fn running_count(&self) -> usize {
        self.running.lock().await.len()
    }

    async fn run_loop(&self, battle_id: Uuid) {
        let mut failures: u32 = 0;

        loop {
            match self.service.process_next_turn(battle_id).await {
                Ok(TurnOutcome::Completed(result)) => {
                    info!(battle_id = %battle_id, result = ?result, "battle completed");
                    return;
                }
                Ok(TurnOutcome::AwaitingPlayer { player_id }) => {
                    failures = 0;
                    let acted = self
                        .service
                        .waiter()
                        .wait_for_action(battle_id, player_id, self.config.player_action_timeout)
                        .await;
                    if !acted {
                        debug!(
                            battle_id = %battle_id,
                            player_id = %player_id,
                            "player action timed out, forfeiting turn"
                        );
                    }
                    match self
                        .service
                        .finish_turn(battle_id, ParticipantKey::player(player_id))
                        .await
                    {
                        Ok(TurnOutcome::Completed(result)) => {
                            info!(battle_id = %battle_id, result = ?result, "battle completed");
                            return;
                        }
                        Ok(_) => {}
                        Err(DomainError::BattleNotFound(_)) => return,
                        Err(error) => {
                            failures += 1;
                            warn!(battle_id = %battle_id, error = %error, "turn finish failed");
                        }
                    }
                }
                Ok(TurnOutcome::Continue) => {
                    failures = 0;
                }
                Err(DomainError::BattleNotFound(_)) => return,
                Err(error) => {
                    failures += 1;
                    warn!(battle_id = %battle_id, error = %error, "turn processing failed");
                }
            }

            if failures >= MAX_CONSECUTIVE_FAILURES {
                warn!(battle_id = %battle_id, "too many consecutive failures, abandoning loop");
                return;
            }

            tokio::time::sleep(self.config.inter_turn_delay).await;
        }
    }
}

impl std::fmt::Debug for BattleLoopService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleLoopService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
