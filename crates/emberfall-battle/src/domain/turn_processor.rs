//! Turn-boundary effect processing.
//!
//! The turn processor sits above the battle aggregate: it resolves
//! what happens to an actor at the start of its turn (wake/disable
//! rolls, curse expiry, duration ticking) and at the end of its turn
//! (damage-over-time, blessing healing), folds the outcome back into
//! the battle, and checks end conditions.

use emberfall_core::clock::Clock;
use emberfall_core::error::DomainError;
use emberfall_core::rng::DeterministicRng;

use super::battle::{Battle, BattleResult};
use super::combat_state::{ParticipantKey, StatusEffectType};

/// Chance a sleeping actor wakes at the start of its turn.
pub const SLEEP_WAKE_CHANCE: f64 = 0.3;
/// Chance paralysis costs the actor its turn.
pub const PARALYSIS_SKIP_CHANCE: f64 = 0.5;
/// Chance a confused actor hurts itself instead of acting.
pub const CONFUSION_SELF_HIT_CHANCE: f64 = 0.3;
/// Fraction of current HP lost to poison at turn end.
pub const POISON_DAMAGE_RATIO: f64 = 0.1;
/// Fixed damage taken from burn at turn end.
pub const BURN_DAMAGE: u32 = 5;
/// Fixed HP restored by blessing at turn end.
pub const BLESSING_HEAL: u32 = 10;

/// Outcome of turn-start processing for one actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnStartResult {
    /// Whether the actor may choose an action this turn.
    pub can_act: bool,
    /// Whether turn-start effects killed the actor.
    pub actor_died: bool,
    /// Battle log lines, in order.
    pub messages: Vec<String>,
}

/// Outcome of turn-end processing for one actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEndResult {
    /// Whether turn-end effects killed the actor.
    pub actor_died: bool,
    /// Battle log lines, in order.
    pub messages: Vec<String>,
}

/// Domain service orchestrating turn-boundary effects on a battle.
#[derive(Debug, Default, Clone, Copy)]
pub struct TurnProcessor;

impl TurnProcessor {
    /// Resolves turn-start effects for `actor`: defend stance reset,
    /// sleep wake roll, paralysis roll, confusion self-damage roll,
    /// curse-expiry death, and the per-turn duration tick. The updated
    /// state is written back to the battle.
    ///
    /// Sub-effect messages are concatenated in resolution order.
    ///
    /// # Errors
    ///
    /// Returns `ActorNotFound` when the actor is not a participant.
    pub fn process_turn_start(
        &self,
        battle: &mut Battle,
        actor: ParticipantKey,
        rng: &mut dyn DeterministicRng,
    ) -> Result<TurnStartResult, DomainError> {
        let state = battle
            .participant(actor)
            .ok_or(DomainError::ActorNotFound(actor.entity_id))?
            .clone();

        let mut messages = Vec::new();
        let mut can_act = true;
        let mut actor_died = false;
        let mut next = state.without_defend();

        if next.has_status(StatusEffectType::Sleep) {
            if rng.next_f64() < SLEEP_WAKE_CHANCE {
                next = next.without_status_effect(StatusEffectType::Sleep);
                messages.push(format!("{} wakes up", next.name));
            } else {
                can_act = false;
                messages.push(format!("{} is fast asleep", next.name));
            }
        }

        if can_act
            && next.has_status(StatusEffectType::Paralysis)
            && rng.next_f64() < PARALYSIS_SKIP_CHANCE
        {
            can_act = false;
            messages.push(format!("{} is paralyzed and cannot move", next.name));
        }

        if can_act
            && next.has_status(StatusEffectType::Confusion)
            && rng.next_f64() < CONFUSION_SELF_HIT_CHANCE
        {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let self_damage = (f64::from(next.stats.attack) * 0.5).floor() as u32;
            next = next.with_hp_damaged(self_damage);
            can_act = false;
            messages.push(format!(
                "{} hurts itself in confusion for {self_damage} damage",
                next.name
            ));
        }

        // The per-turn tick ages every effect and buff; a curse whose
        // last turn just elapsed claims the actor.
        let curse_expiring = next
            .status_effects
            .get(&StatusEffectType::Curse)
            .is_some_and(|s| s.duration == 1);
        next = next.with_turn_progression();
        if curse_expiring {
            let max_hp = next.hp.max();
            next = next.with_hp_damaged(max_hp);
            can_act = false;
            actor_died = true;
            messages.push(format!("the curse claims {}", next.name));
        }

        if !next.is_alive() {
            actor_died = true;
            can_act = false;
        }

        next = next.with_can_act(can_act);
        battle.update_participant(actor, next)?;

        Ok(TurnStartResult {
            can_act,
            actor_died,
            messages,
        })
    }

    /// Resolves turn-end effects for `actor`: poison percent-of-HP
    /// damage, fixed burn damage, and blessing healing. The updated
    /// state is written back to the battle.
    ///
    /// # Errors
    ///
    /// Returns `ActorNotFound` when the actor is not a participant.
    pub fn process_turn_end(
        &self,
        battle: &mut Battle,
        actor: ParticipantKey,
    ) -> Result<TurnEndResult, DomainError> {
        let state = battle
            .participant(actor)
            .ok_or(DomainError::ActorNotFound(actor.entity_id))?
            .clone();

        let mut messages = Vec::new();
        let mut next = state;

        if next.has_status(StatusEffectType::Poison) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let damage = (f64::from(next.hp.value()) * POISON_DAMAGE_RATIO).floor() as u32;
            next = next.with_hp_damaged(damage);
            messages.push(format!("{} suffers {damage} poison damage", next.name));
        }

        if next.has_status(StatusEffectType::Burn) {
            next = next.with_hp_damaged(BURN_DAMAGE);
            messages.push(format!("{} is scorched for {BURN_DAMAGE} damage", next.name));
        }

        if next.has_status(StatusEffectType::Blessing) {
            next = next.with_hp_healed(BLESSING_HEAL);
            messages.push(format!("{} is blessed and recovers {BLESSING_HEAL} HP", next.name));
        }

        let actor_died = !next.is_alive();
        battle.update_participant(actor, next)?;

        Ok(TurnEndResult {
            actor_died,
            messages,
        })
    }

    /// Ends the battle if an end condition holds, returning the result.
    ///
    /// # Errors
    ///
    /// Propagates aggregate validation failures from `end_battle`.
    pub fn check_and_handle_battle_end(
        &self,
        battle: &mut Battle,
        clock: &dyn Clock,
    ) -> Result<Option<BattleResult>, DomainError> {
        match battle.check_battle_end_conditions() {
            Some(result) => {
                battle.end_battle(result, clock)?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    /// Advances the battle to the next turn.
    ///
    /// # Errors
    ///
    /// Propagates aggregate validation failures.
    pub fn advance_turn(
        &self,
        battle: &mut Battle,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        battle.advance_to_next_turn(rng, clock)
    }
}
