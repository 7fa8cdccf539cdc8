//! Immutable per-participant combat snapshots.
//!
//! Every mutation produces a new `CombatState` value. The owning battle
//! loop is the single writer of a battle's states, and copy-on-write
//! keeps that discipline auditable: a state observed by one loop
//! iteration can never change underneath it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a participant is a player or a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantType {
    /// A human-controlled participant.
    Player,
    /// An engine-controlled participant.
    Monster,
}

/// Identity of one battle participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantKey {
    /// Player or monster.
    pub participant_type: ParticipantType,
    /// The entity identifier within its type.
    pub entity_id: Uuid,
}

impl ParticipantKey {
    /// Creates a player key.
    #[must_use]
    pub fn player(entity_id: Uuid) -> Self {
        Self {
            participant_type: ParticipantType::Player,
            entity_id,
        }
    }

    /// Creates a monster key.
    #[must_use]
    pub fn monster(entity_id: Uuid) -> Self {
        Self {
            participant_type: ParticipantType::Monster,
            entity_id,
        }
    }
}

/// Elemental affinity of a participant or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// No elemental affinity.
    Neutral,
    /// Fire.
    Fire,
    /// Water.
    Water,
    /// Earth.
    Earth,
    /// Wind.
    Wind,
    /// Light.
    Light,
    /// Dark.
    Dark,
}

impl Element {
    /// Elemental compatibility multiplier when `self` attacks `defender`.
    ///
    /// The four natural elements form a cycle (Fire → Wind → Earth →
    /// Water → Fire) where attacking with the advantage deals 1.5× and
    /// attacking against it deals 0.5×. Light and Dark amplify each
    /// other. Everything else is neutral.
    #[must_use]
    pub fn compatibility_multiplier(self, defender: Element) -> f64 {
        use Element::{Dark, Earth, Fire, Light, Water, Wind};
        match (self, defender) {
            (Fire, Wind) | (Wind, Earth) | (Earth, Water) | (Water, Fire) => 1.5,
            (Wind, Fire) | (Earth, Wind) | (Water, Earth) | (Fire, Water) => 0.5,
            (Light, Dark) | (Dark, Light) => 1.5,
            _ => 1.0,
        }
    }
}

/// Race of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    /// Humans.
    Human,
    /// Beasts.
    Beast,
    /// Dragons.
    Dragon,
    /// Undead.
    Undead,
    /// Spirits.
    Spirit,
    /// Slimes.
    Slime,
}

/// A disabling or damaging condition with a remaining-turn duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffectType {
    /// Percent-of-HP damage at turn end.
    Poison,
    /// Fixed damage at turn end.
    Burn,
    /// Actor cannot act until it wakes.
    Sleep,
    /// Actor has a chance of losing its turn.
    Paralysis,
    /// Actor has a chance of hurting itself.
    Confusion,
    /// Actor cannot use magic actions.
    Silence,
    /// Actor dies when the curse expires.
    Curse,
    /// Actor is healed at turn end.
    Blessing,
}

/// A multiplicative stat modifier with a remaining-turn duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffType {
    /// Scales outgoing attack power.
    Attack,
    /// Scales incoming damage mitigation.
    Defense,
    /// Scales initiative speed.
    Speed,
}

/// A bounded resource value clamped to `[0, max]`.
///
/// Clamping lives here, not in the actions: a damage or heal delta can
/// never push the value outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedValue {
    value: u32,
    max: u32,
}

impl BoundedValue {
    /// Creates a bounded value, clamping `value` to `max`.
    #[must_use]
    pub fn new(value: u32, max: u32) -> Self {
        Self {
            value: value.min(max),
            max,
        }
    }

    /// Creates a bounded value at its maximum.
    #[must_use]
    pub fn full(max: u32) -> Self {
        Self { value: max, max }
    }

    /// The current value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// The upper bound.
    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Returns a copy reduced by `amount`, floored at zero.
    #[must_use]
    pub fn damaged(self, amount: u32) -> Self {
        Self {
            value: self.value.saturating_sub(amount),
            max: self.max,
        }
    }

    /// Returns a copy increased by `amount`, capped at the maximum.
    #[must_use]
    pub fn healed(self, amount: u32) -> Self {
        Self {
            value: self.value.saturating_add(amount).min(self.max),
            max: self.max,
        }
    }

    /// Whether the value has reached zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }
}

/// An active status effect attached to a `CombatState`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectState {
    /// The effect kind.
    pub effect: StatusEffectType,
    /// Remaining turns; the effect expires at zero.
    pub duration: u32,
}

impl StatusEffectState {
    /// Creates a status effect with the given remaining duration.
    #[must_use]
    pub fn new(effect: StatusEffectType, duration: u32) -> Self {
        Self { effect, duration }
    }

    /// Whether the effect has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.duration == 0
    }

    /// Returns a copy with the duration reduced by one turn.
    #[must_use]
    pub fn decremented(self) -> Self {
        Self {
            effect: self.effect,
            duration: self.duration.saturating_sub(1),
        }
    }
}

/// An active buff attached to a `CombatState`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffState {
    /// The stat this buff scales.
    pub buff: BuffType,
    /// The multiplier applied while active.
    pub multiplier: f64,
    /// Remaining turns; the buff expires at zero.
    pub duration: u32,
}

impl BuffState {
    /// Creates a buff with the given multiplier and remaining duration.
    #[must_use]
    pub fn new(buff: BuffType, multiplier: f64, duration: u32) -> Self {
        Self {
            buff,
            multiplier,
            duration,
        }
    }

    /// Whether the buff has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.duration == 0
    }

    /// Returns a copy with the duration reduced by one turn.
    #[must_use]
    pub fn decremented(self) -> Self {
        Self {
            buff: self.buff,
            multiplier: self.multiplier,
            duration: self.duration.saturating_sub(1),
        }
    }
}

/// Static combat statistics of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Base attack power.
    pub attack: u32,
    /// Base damage mitigation.
    pub defense: u32,
    /// Initiative speed.
    pub speed: u32,
    /// Probability of a critical hit, in `[0, 1]`.
    pub critical_rate: f64,
    /// Probability of evading an incoming action, in `[0, 1]`.
    pub evasion_rate: f64,
}

/// Immutable snapshot of one participant's in-battle condition.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatState {
    /// The entity this state belongs to.
    pub entity_id: Uuid,
    /// Player or monster.
    pub participant_type: ParticipantType,
    /// Display name.
    pub name: String,
    /// Race, used for race-attack multipliers.
    pub race: Race,
    /// Elemental affinity, used for compatibility multipliers.
    pub element: Element,
    /// Current hit points.
    pub hp: BoundedValue,
    /// Current magic points.
    pub mp: BoundedValue,
    /// Active status effects by kind.
    pub status_effects: HashMap<StatusEffectType, StatusEffectState>,
    /// Active buffs by kind.
    pub buffs: HashMap<BuffType, BuffState>,
    /// Whether the participant is defending this round.
    pub is_defending: bool,
    /// Whether the participant may act on its turn.
    pub can_act: bool,
    /// Static combat statistics.
    pub stats: CombatStats,
    /// Actions this participant may use.
    pub available_action_ids: Vec<Uuid>,
}

impl CombatState {
    /// Creates a fresh combat state for a participant entering battle.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entity_id: Uuid,
        participant_type: ParticipantType,
        name: String,
        race: Race,
        element: Element,
        hp: BoundedValue,
        mp: BoundedValue,
        stats: CombatStats,
        available_action_ids: Vec<Uuid>,
    ) -> Self {
        Self {
            entity_id,
            participant_type,
            name,
            race,
            element,
            hp,
            mp,
            status_effects: HashMap::new(),
            buffs: HashMap::new(),
            is_defending: false,
            can_act: true,
            stats,
            available_action_ids,
        }
    }

    /// Identity of this participant within a battle.
    #[must_use]
    pub fn key(&self) -> ParticipantKey {
        ParticipantKey {
            participant_type: self.participant_type,
            entity_id: self.entity_id,
        }
    }

    /// Whether the participant is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.hp.is_zero()
    }

    /// Whether the given status effect is active.
    #[must_use]
    pub fn has_status(&self, effect: StatusEffectType) -> bool {
        self.status_effects.contains_key(&effect)
    }

    /// The active multiplier for a buff kind, `1.0` when absent.
    #[must_use]
    pub fn buff_multiplier(&self, buff: BuffType) -> f64 {
        self.buffs.get(&buff).map_or(1.0, |b| b.multiplier)
    }

    /// Effective attack power with the attack buff applied.
    #[must_use]
    pub fn calculate_current_attack(&self) -> f64 {
        f64::from(self.stats.attack) * self.buff_multiplier(BuffType::Attack)
    }

    /// Effective defense with the defense buff applied, scaled by the
    /// defend-stance factor while defending.
    #[must_use]
    pub fn calculate_current_defense(&self) -> f64 {
        let base = f64::from(self.stats.defense) * self.buff_multiplier(BuffType::Defense);
        if self.is_defending { base * 0.5 } else { base }
    }

    /// Effective speed with the speed buff applied.
    #[must_use]
    pub fn calculate_current_speed(&self) -> f64 {
        f64::from(self.stats.speed) * self.buff_multiplier(BuffType::Speed)
    }

    /// Returns a copy with HP reduced by `amount` (floored at zero).
    #[must_use]
    pub fn with_hp_damaged(&self, amount: u32) -> Self {
        let mut next = self.clone();
        next.hp = next.hp.damaged(amount);
        next
    }

    /// Returns a copy with HP increased by `amount` (capped at max).
    #[must_use]
    pub fn with_hp_healed(&self, amount: u32) -> Self {
        let mut next = self.clone();
        next.hp = next.hp.healed(amount);
        next
    }

    /// Returns a copy with MP reduced by `amount` (floored at zero).
    #[must_use]
    pub fn with_mp_consumed(&self, amount: u32) -> Self {
        let mut next = self.clone();
        next.mp = next.mp.damaged(amount);
        next
    }

    /// Returns a copy with MP increased by `amount` (capped at max).
    #[must_use]
    pub fn with_mp_healed(&self, amount: u32) -> Self {
        let mut next = self.clone();
        next.mp = next.mp.healed(amount);
        next
    }

    /// Returns a copy with the given status effect attached, replacing
    /// any existing effect of the same kind.
    #[must_use]
    pub fn with_status_effect(&self, effect: StatusEffectType, duration: u32) -> Self {
        let mut next = self.clone();
        next.status_effects
            .insert(effect, StatusEffectState::new(effect, duration));
        next
    }

    /// Returns a copy with the given status effect removed.
    #[must_use]
    pub fn without_status_effect(&self, effect: StatusEffectType) -> Self {
        let mut next = self.clone();
        next.status_effects.remove(&effect);
        next
    }

    /// Returns a copy with the given buff attached, replacing any
    /// existing buff of the same kind.
    #[must_use]
    pub fn with_buff(&self, buff: BuffType, multiplier: f64, duration: u32) -> Self {
        let mut next = self.clone();
        next.buffs
            .insert(buff, BuffState::new(buff, multiplier, duration));
        next
    }

    /// Returns a copy with the given buff removed.
    #[must_use]
    pub fn without_buff(&self, buff: BuffType) -> Self {
        let mut next = self.clone();
        next.buffs.remove(&buff);
        next
    }

    /// Returns a copy with every active effect and buff aged by one
    /// turn. Effects and buffs whose duration reaches zero are dropped.
    #[must_use]
    pub fn with_turn_progression(&self) -> Self {
        let mut next = self.clone();
        next.status_effects = next
            .status_effects
            .values()
            .map(|s| s.decremented())
            .filter(|s| !s.is_expired())
            .map(|s| (s.effect, s))
            .collect();
        next.buffs = next
            .buffs
            .values()
            .map(|b| b.decremented())
            .filter(|b| !b.is_expired())
            .map(|b| (b.buff, b))
            .collect();
        next
    }

    /// Returns a copy with the defend flag raised.
    #[must_use]
    pub fn with_defend(&self) -> Self {
        let mut next = self.clone();
        next.is_defending = true;
        next
    }

    /// Returns a copy with the defend flag cleared.
    #[must_use]
    pub fn without_defend(&self) -> Self {
        let mut next = self.clone();
        next.is_defending = false;
        next
    }

    /// Returns a copy with the can-act flag set.
    #[must_use]
    pub fn with_can_act(&self, can_act: bool) -> Self {
        let mut next = self.clone();
        next.can_act = can_act;
        next
    }
}
