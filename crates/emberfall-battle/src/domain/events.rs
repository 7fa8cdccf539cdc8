//! Domain events for the combat context.
//!
//! Events are accumulated on the battle aggregate and drained by the
//! caller after each step; the aggregate never publishes them itself.

use emberfall_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::battle::BattleResult;
use super::combat_state::ParticipantKey;

/// Per-participant totals reported when a battle ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsEntry {
    /// The participant the totals belong to.
    pub participant: ParticipantKey,
    /// Damage this participant dealt.
    pub damage_dealt: u64,
    /// Damage this participant received.
    pub damage_taken: u64,
    /// Healing this participant performed.
    pub healing_done: u64,
}

/// Emitted when a battle leaves the waiting state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleStarted {
    /// The battle.
    pub battle_id: Uuid,
    /// The spot the battle occupies.
    pub spot_id: Uuid,
    /// Participant count at the start.
    pub participant_count: usize,
}

/// Emitted at the top of each round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundStarted {
    /// The battle.
    pub battle_id: Uuid,
    /// The round now beginning.
    pub round: u32,
}

/// Emitted when one participant's turn finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnEnded {
    /// The battle.
    pub battle_id: Uuid,
    /// The participant whose turn ended.
    pub actor: ParticipantKey,
    /// The global turn counter after this turn.
    pub turn: u32,
}

/// Emitted when a round's final turn finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundEnded {
    /// The battle.
    pub battle_id: Uuid,
    /// The round that ended.
    pub round: u32,
}

/// Emitted when an action has been resolved against the battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionExecuted {
    /// The battle.
    pub battle_id: Uuid,
    /// The acting participant.
    pub actor: ParticipantKey,
    /// Display name of the action.
    pub action_name: String,
    /// Whether the action took effect.
    pub success: bool,
    /// Failure tag when it did not.
    pub failure_reason: Option<String>,
    /// Battle log lines produced by the action.
    pub messages: Vec<String>,
}

/// Emitted when a player joins mid-battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerJoined {
    /// The battle.
    pub battle_id: Uuid,
    /// The joining player.
    pub player_id: Uuid,
    /// Player count after the join.
    pub player_count: usize,
}

/// Emitted when a player escapes mid-battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEscaped {
    /// The battle.
    pub battle_id: Uuid,
    /// The escaping player.
    pub player_id: Uuid,
}

/// Emitted when the battle completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEnded {
    /// The battle.
    pub battle_id: Uuid,
    /// The terminal outcome.
    pub result: BattleResult,
    /// Rounds fought.
    pub rounds: u32,
    /// Per-participant totals.
    pub statistics: Vec<StatisticsEntry>,
}

/// Event payload variants for the combat context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BattleEventKind {
    /// The battle started.
    BattleStarted(BattleStarted),
    /// A round began.
    RoundStarted(RoundStarted),
    /// A turn ended.
    TurnEnded(TurnEnded),
    /// A round ended.
    RoundEnded(RoundEnded),
    /// An action was resolved.
    ActionExecuted(ActionExecuted),
    /// A player joined.
    PlayerJoined(PlayerJoined),
    /// A player escaped.
    PlayerEscaped(PlayerEscaped),
    /// The battle completed.
    BattleEnded(BattleEnded),
}

/// Domain event envelope for the combat context.
#[derive(Debug, Clone)]
pub struct BattleEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: BattleEventKind,
}

impl DomainEvent for BattleEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            BattleEventKind::BattleStarted(_) => "battle.started",
            BattleEventKind::RoundStarted(_) => "battle.round_started",
            BattleEventKind::TurnEnded(_) => "battle.turn_ended",
            BattleEventKind::RoundEnded(_) => "battle.round_ended",
            BattleEventKind::ActionExecuted(_) => "battle.action_executed",
            BattleEventKind::PlayerJoined(_) => "battle.player_joined",
            BattleEventKind::PlayerEscaped(_) => "battle.player_escaped",
            BattleEventKind::BattleEnded(_) => "battle.ended",
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("BattleEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
