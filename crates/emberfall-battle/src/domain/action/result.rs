//! Value objects describing the effect of one executed action.
//!
//! A `BattleActionResult` is produced by action execution and consumed
//! immediately by the battle aggregate, which folds the described
//! deltas into its combat states and then discards the result.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::combat_state::{
    BuffState, BuffType, ParticipantKey, StatusEffectState, StatusEffectType,
};

/// Changes to apply to the acting participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorStateChange {
    /// Signed HP delta (action costs are negative).
    pub hp_delta: i64,
    /// Signed MP delta (action costs are negative).
    pub mp_delta: i64,
    /// When set, the actor's defend flag is forced to this value.
    pub set_defending: Option<bool>,
}

impl ActorStateChange {
    /// Whether this change does anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hp_delta == 0 && self.mp_delta == 0 && self.set_defending.is_none()
    }
}

/// Changes to apply to one target, with attack metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStateChange {
    /// The affected participant.
    pub target: ParticipantKey,
    /// Signed HP delta (damage negative, healing positive).
    pub hp_delta: i64,
    /// Signed MP delta.
    pub mp_delta: i64,
    /// Status effects to attach.
    pub add_status_effects: Vec<StatusEffectState>,
    /// Status effect kinds to remove.
    pub remove_status_effects: Vec<StatusEffectType>,
    /// Buffs to attach.
    pub add_buffs: Vec<BuffState>,
    /// Buff kinds to remove.
    pub remove_buffs: Vec<BuffType>,
    /// Whether the target evaded (no deltas applied).
    pub evaded: bool,
    /// Whether the hit was critical.
    pub critical: bool,
    /// Elemental compatibility multiplier that was applied.
    pub compatibility_multiplier: f64,
    /// Race-attack multiplier that was applied.
    pub race_multiplier: f64,
}

impl TargetStateChange {
    /// A neutral change for `target` with no deltas.
    #[must_use]
    pub fn neutral(target: ParticipantKey) -> Self {
        Self {
            target,
            hp_delta: 0,
            mp_delta: 0,
            add_status_effects: Vec::new(),
            remove_status_effects: Vec::new(),
            add_buffs: Vec::new(),
            remove_buffs: Vec::new(),
            evaded: false,
            critical: false,
            compatibility_multiplier: 1.0,
            race_multiplier: 1.0,
        }
    }

    /// A change marking the target as having evaded.
    #[must_use]
    pub fn evaded(target: ParticipantKey) -> Self {
        Self {
            evaded: true,
            ..Self::neutral(target)
        }
    }
}

/// The outcome of one executed battle action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleActionResult {
    /// Whether the action took effect.
    pub success: bool,
    /// Tag describing why the action failed (`"missed"`, `"evaded"`,
    /// `"insufficient_mp"`, ...). `None` on success.
    pub failure_reason: Option<String>,
    /// The executed action.
    pub action_id: Uuid,
    /// Display name of the executed action.
    pub action_name: String,
    /// The acting participant.
    pub actor: ParticipantKey,
    /// Changes to the actor (resource costs, defend flag).
    pub actor_change: ActorStateChange,
    /// Per-target changes.
    pub target_changes: Vec<TargetStateChange>,
    /// Human-readable battle log lines, in order.
    pub messages: Vec<String>,
}

impl BattleActionResult {
    /// A successful result skeleton for the given action and actor.
    #[must_use]
    pub fn success(action_id: Uuid, action_name: String, actor: ParticipantKey) -> Self {
        Self {
            success: true,
            failure_reason: None,
            action_id,
            action_name,
            actor,
            actor_change: ActorStateChange::default(),
            target_changes: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// A failed result carrying a machine-readable reason tag.
    #[must_use]
    pub fn failed(
        action_id: Uuid,
        action_name: String,
        actor: ParticipantKey,
        reason: &str,
    ) -> Self {
        Self {
            success: false,
            failure_reason: Some(reason.to_owned()),
            action_id,
            action_name,
            actor,
            actor_change: ActorStateChange::default(),
            target_changes: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Total damage dealt across all targets (negative HP deltas).
    #[must_use]
    pub fn total_damage(&self) -> u64 {
        self.target_changes
            .iter()
            .filter(|c| c.hp_delta < 0)
            .map(|c| c.hp_delta.unsigned_abs())
            .sum()
    }

    /// Total healing done across all targets (positive HP deltas).
    #[must_use]
    pub fn total_healing(&self) -> u64 {
        self.target_changes
            .iter()
            .filter(|c| c.hp_delta > 0)
            .map(|c| c.hp_delta.unsigned_abs())
            .sum()
    }
}
