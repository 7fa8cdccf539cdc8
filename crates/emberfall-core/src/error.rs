//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type for the battle engine.
///
/// Not-found and conflict variants propagate to the caller as hard
/// failures. Action-legality variants (`InsufficientMp`,
/// `InsufficientHp`, `Silenced`) are caught at the action-execution
/// boundary and converted into failed action results for player
/// actions, or logged and skipped for monster actions.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A battle was not found.
    #[error("battle not found: {0}")]
    BattleNotFound(Uuid),

    /// A battle participant (player or monster) was not found.
    #[error("actor not found: {0}")]
    ActorNotFound(Uuid),

    /// An area was not found for the given spot.
    #[error("area not found for spot: {0}")]
    AreaNotFound(Uuid),

    /// A battle already exists at the given spot.
    #[error("battle already exists at spot {0}")]
    BattleAlreadyExists(Uuid),

    /// A battle loop is already running for the given battle.
    #[error("battle loop already running for battle {0}")]
    BattleLoopAlreadyRunning(Uuid),

    /// The battle is not in a state that allows the operation.
    #[error("battle {battle_id} is not in progress")]
    BattleNotInProgress {
        /// The battle in the wrong state.
        battle_id: Uuid,
    },

    /// The battle cannot accept another player.
    #[error("battle {battle_id} is full ({max_players} players)")]
    BattleFull {
        /// The full battle.
        battle_id: Uuid,
        /// Its configured player cap.
        max_players: usize,
    },

    /// An action was submitted by a participant whose turn it is not.
    #[error("it is not the turn of {actor_id} in battle {battle_id}")]
    InvalidTurn {
        /// The battle.
        battle_id: Uuid,
        /// The out-of-turn actor.
        actor_id: Uuid,
    },

    /// The actor lacks the MP to pay an action's cost.
    #[error("insufficient MP: required {required}, available {available}")]
    InsufficientMp {
        /// MP the action costs.
        required: u32,
        /// MP the actor has.
        available: u32,
    },

    /// The actor lacks the HP to pay an action's cost.
    #[error("insufficient HP: required {required}, available {available}")]
    InsufficientHp {
        /// HP the action costs.
        required: u32,
        /// HP the actor has.
        available: u32,
    },

    /// A silenced actor attempted a magic action.
    #[error("actor {0} is silenced and cannot use magic")]
    Silenced(Uuid),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Whether this error is an action-legality failure that should be
    /// converted into a failed action result instead of propagating.
    #[must_use]
    pub fn is_action_legality(&self) -> bool {
        matches!(
            self,
            Self::InsufficientMp { .. } | Self::InsufficientHp { .. } | Self::Silenced(_)
        )
    }
}
