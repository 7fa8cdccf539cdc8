//! Commands accepted by the combat context.

use serde::Deserialize;
use uuid::Uuid;

use super::combat_state::ParticipantKey;

/// Start a battle at an area spot.
#[derive(Debug, Clone, Deserialize)]
pub struct StartBattle {
    /// The spot to fight at.
    pub spot_id: Uuid,
    /// The initiating player.
    pub player_id: Uuid,
}

/// Execute an action on behalf of a player whose turn it is.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutePlayerAction {
    /// The battle the action belongs to.
    pub battle_id: Uuid,
    /// The acting player.
    pub player_id: Uuid,
    /// The catalog action to execute.
    pub action_id: Uuid,
    /// Explicit targets; empty defers to the action's default policy.
    #[serde(default)]
    pub targets: Vec<ParticipantKey>,
}

/// Join a running battle.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinBattle {
    /// The battle to join.
    pub battle_id: Uuid,
    /// The joining player.
    pub player_id: Uuid,
}

/// Escape from a running battle.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveBattle {
    /// The battle to leave.
    pub battle_id: Uuid,
    /// The escaping player.
    pub player_id: Uuid,
}
