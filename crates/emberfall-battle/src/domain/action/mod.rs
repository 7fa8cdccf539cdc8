//! Polymorphic battle actions.
//!
//! Every action resolves through the same four-stage template:
//! resolve targets, validate the actor, consume declared resource
//! costs, then run the kind-specific core. The core is the only part
//! that differs between attack, heal, status, buff, and defend.

pub mod logic;
pub mod result;

use std::collections::HashMap;

use emberfall_core::error::DomainError;
use emberfall_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use self::logic::{BattleLogic, HitOutcome, race_multiplier_for};
use self::result::{BattleActionResult, TargetStateChange};
use super::combat_state::{
    BuffState, BuffType, CombatState, Element, ParticipantKey, Race,
    StatusEffectState, StatusEffectType,
};

/// Broad action category; silence blocks magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    /// Physical techniques, unaffected by silence.
    Physical,
    /// Magic, blocked while silenced.
    Magic,
}

/// Default target selection when the request names no targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// The first living opposing participant.
    FirstEnemy,
    /// Every living opposing participant.
    AllEnemies,
    /// Every living participant on the actor's side.
    AllAllies,
    /// The actor alone.
    SelfOnly,
}

/// A chance-based status effect rider on an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusRider {
    /// The effect to apply.
    pub effect: StatusEffectType,
    /// Turns the effect lasts.
    pub duration: u32,
    /// Per-target application chance in `[0, 1]`.
    pub chance: f64,
}

/// A chance-based buff rider on an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffRider {
    /// The buff to apply.
    pub buff: BuffType,
    /// The buff's stat multiplier.
    pub multiplier: f64,
    /// Turns the buff lasts.
    pub duration: u32,
    /// Per-target application chance in `[0, 1]`.
    pub chance: f64,
}

/// Parameters of a damaging action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackParams {
    /// Scales the actor's effective attack.
    pub damage_multiplier: f64,
    /// The action's own chance to connect; `None` means it cannot
    /// miss outright (evasion still applies).
    pub hit_rate: Option<f64>,
    /// Element of the attack; falls back to the actor's element.
    pub element: Option<Element>,
    /// Bonus multipliers against specific races.
    pub race_multipliers: Vec<(Race, f64)>,
    /// Status effects rolled per connected hit.
    pub status_riders: Vec<StatusRider>,
    /// Buffs (usually debuffs) rolled per connected hit.
    pub buff_riders: Vec<BuffRider>,
}

/// Parameters of a restorative action. At least one of the two amounts
/// must be positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealParams {
    /// HP restored per target.
    pub heal_hp_amount: u32,
    /// MP restored per target.
    pub heal_mp_amount: u32,
    /// Status effect kinds cleared from each target.
    pub cures_status: Vec<StatusEffectType>,
    /// Buff kinds cleared from each target.
    pub removes_buffs: Vec<BuffType>,
}

/// Parameters of a pure status-infliction action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyStatusParams {
    /// The action's own chance to connect.
    pub hit_rate: Option<f64>,
    /// Effects rolled per connected target.
    pub effects: Vec<StatusRider>,
}

/// Parameters of a pure buff-application action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyBuffParams {
    /// The action's own chance to connect.
    pub hit_rate: Option<f64>,
    /// Buffs rolled per connected target.
    pub buffs: Vec<BuffRider>,
}

/// The kind-specific core of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Deal damage, with optional riders.
    Attack(AttackParams),
    /// Restore HP/MP and clear conditions.
    Heal(HealParams),
    /// Inflict status effects without damage.
    ApplyStatus(ApplyStatusParams),
    /// Apply buffs without damage.
    ApplyBuff(ApplyBuffParams),
    /// Raise the actor's defend flag.
    Defend,
}

/// Static definition of an action, loaded from the action catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Catalog identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Physical or magic.
    pub action_type: ActionType,
    /// MP consumed on execution.
    pub mp_cost: u32,
    /// HP consumed on execution.
    pub hp_cost: u32,
    /// Target selection when the request names no targets.
    pub default_targets: TargetPolicy,
    /// The kind-specific parameters.
    pub kind: ActionKind,
}

/// One discrete combat action bound to an actor and optional explicit
/// targets, ready to execute against the current participant set.
#[derive(Debug, Clone)]
pub struct BattleAction {
    /// The action's static definition.
    pub definition: ActionDefinition,
    /// The acting participant.
    pub actor: ParticipantKey,
    /// Explicit targets; empty means the definition's default policy.
    pub explicit_targets: Vec<ParticipantKey>,
}

impl BattleAction {
    /// Binds an action definition to an actor and targets.
    #[must_use]
    pub fn new(
        definition: ActionDefinition,
        actor: ParticipantKey,
        explicit_targets: Vec<ParticipantKey>,
    ) -> Self {
        Self {
            definition,
            actor,
            explicit_targets,
        }
    }

    /// Executes the action against the current participant set.
    ///
    /// Runs the shared template: resolve targets, validate the actor,
    /// consume the declared MP/HP cost, then the kind-specific core.
    ///
    /// # Errors
    ///
    /// Returns `ActorNotFound` if the actor is not a participant,
    /// `Silenced` / `InsufficientMp` / `InsufficientHp` on validation
    /// failure, and `Validation` when no legal target exists. Legality
    /// errors are expected to be converted into failed results at the
    /// action-execution boundary.
    pub fn execute(
        &self,
        participants: &HashMap<ParticipantKey, CombatState>,
        battle_logic: &BattleLogic,
        rng: &mut dyn DeterministicRng,
    ) -> Result<BattleActionResult, DomainError> {
        let actor_state = participants
            .get(&self.actor)
            .ok_or(DomainError::ActorNotFound(self.actor.entity_id))?;

        let targets = self.resolve_targets(actor_state, participants)?;
        self.validate(actor_state)?;

        let mut result = BattleActionResult::success(
            self.definition.id,
            self.definition.name.clone(),
            self.actor,
        );
        self.consume_resources(actor_state, &mut result);

        match &self.definition.kind {
            ActionKind::Attack(params) => {
                self.execute_attack(params, actor_state, &targets, participants, battle_logic, rng, &mut result);
            }
            ActionKind::Heal(params) => {
                Self::execute_heal(params, actor_state, &targets, participants, &mut result)?;
            }
            ActionKind::ApplyStatus(params) => {
                self.execute_apply_status(params, actor_state, &targets, participants, battle_logic, rng, &mut result);
            }
            ActionKind::ApplyBuff(params) => {
                self.execute_apply_buff(params, actor_state, &targets, participants, battle_logic, rng, &mut result);
            }
            ActionKind::Defend => {
                result.actor_change.set_defending = Some(true);
                result
                    .messages
                    .push(format!("{} braces for impact", actor_state.name));
            }
        }

        Ok(result)
    }

    /// Stage one: explicit targets if supplied (filtered to living
    /// participants), otherwise the definition's default policy.
    fn resolve_targets(
        &self,
        actor_state: &CombatState,
        participants: &HashMap<ParticipantKey, CombatState>,
    ) -> Result<Vec<ParticipantKey>, DomainError> {
        if matches!(self.definition.kind, ActionKind::Defend) {
            return Ok(Vec::new());
        }

        if !self.explicit_targets.is_empty() {
            let living: Vec<ParticipantKey> = self
                .explicit_targets
                .iter()
                .filter(|key| participants.get(key).is_some_and(CombatState::is_alive))
                .copied()
                .collect();
            if living.is_empty() {
                return Err(DomainError::Validation(
                    "no living target for action".to_owned(),
                ));
            }
            return Ok(living);
        }

        let opposes = |other: &CombatState| other.participant_type != actor_state.participant_type;
        let allied = |other: &CombatState| other.participant_type == actor_state.participant_type;

        let mut selected: Vec<ParticipantKey> = match self.definition.default_targets {
            TargetPolicy::SelfOnly => vec![self.actor],
            TargetPolicy::FirstEnemy => participants
                .values()
                .filter(|s| s.is_alive() && opposes(s))
                .map(CombatState::key)
                .take(1)
                .collect(),
            TargetPolicy::AllEnemies => participants
                .values()
                .filter(|s| s.is_alive() && opposes(s))
                .map(CombatState::key)
                .collect(),
            TargetPolicy::AllAllies => participants
                .values()
                .filter(|s| s.is_alive() && allied(s))
                .map(CombatState::key)
                .collect(),
        };
        selected.sort_by_key(|key| key.entity_id);

        if selected.is_empty() {
            return Err(DomainError::Validation(
                "no living target for action".to_owned(),
            ));
        }
        Ok(selected)
    }

    /// Stage two: silence and resource-sufficiency checks.
    fn validate(&self, actor_state: &CombatState) -> Result<(), DomainError> {
        if !actor_state.can_act {
            return Err(DomainError::Validation(format!(
                "{} cannot act this turn",
                actor_state.name
            )));
        }
        if self.definition.action_type == ActionType::Magic
            && actor_state.has_status(StatusEffectType::Silence)
        {
            return Err(DomainError::Silenced(actor_state.entity_id));
        }
        if actor_state.mp.value() < self.definition.mp_cost {
            return Err(DomainError::InsufficientMp {
                required: self.definition.mp_cost,
                available: actor_state.mp.value(),
            });
        }
        if actor_state.hp.value() <= self.definition.hp_cost {
            return Err(DomainError::InsufficientHp {
                required: self.definition.hp_cost,
                available: actor_state.hp.value(),
            });
        }
        Ok(())
    }

    /// Stage three: fold the declared costs into the actor change and
    /// emit the base message.
    fn consume_resources(&self, actor_state: &CombatState, result: &mut BattleActionResult) {
        result.actor_change.mp_delta = -i64::from(self.definition.mp_cost);
        result.actor_change.hp_delta = -i64::from(self.definition.hp_cost);
        result
            .messages
            .push(format!("{} uses {}", actor_state.name, self.definition.name));
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_attack(
        &self,
        params: &AttackParams,
        actor_state: &CombatState,
        targets: &[ParticipantKey],
        participants: &HashMap<ParticipantKey, CombatState>,
        battle_logic: &BattleLogic,
        rng: &mut dyn DeterministicRng,
        result: &mut BattleActionResult,
    ) {
        let element = params.element.unwrap_or(actor_state.element);
        let mut any_hit = false;
        let mut any_evaded = false;

        for key in targets {
            let Some(target_state) = participants.get(key) else {
                continue;
            };
            match battle_logic
                .hit_resolver
                .resolve_hit(actor_state, target_state, params.hit_rate, rng)
            {
                HitOutcome::Missed => {}
                HitOutcome::Evaded => {
                    any_evaded = true;
                    result.target_changes.push(TargetStateChange::evaded(*key));
                    result
                        .messages
                        .push(format!("{} evades the attack", target_state.name));
                }
                HitOutcome::Hit { critical } => {
                    any_hit = true;
                    let compatibility = element.compatibility_multiplier(target_state.element);
                    let race_multiplier =
                        race_multiplier_for(&params.race_multipliers, target_state.race);
                    let damage = battle_logic.damage_calculator.calculate_damage(
                        actor_state,
                        target_state,
                        params.damage_multiplier,
                        compatibility,
                        race_multiplier,
                        critical,
                    );

                    let mut change = TargetStateChange::neutral(*key);
                    change.hp_delta = -i64::from(damage);
                    change.critical = critical;
                    change.compatibility_multiplier = compatibility;
                    change.race_multiplier = race_multiplier;

                    for rider in &params.status_riders {
                        if rng.next_f64() < rider.chance {
                            change
                                .add_status_effects
                                .push(StatusEffectState::new(rider.effect, rider.duration));
                        }
                    }
                    for rider in &params.buff_riders {
                        if rng.next_f64() < rider.chance {
                            change.add_buffs.push(BuffState::new(
                                rider.buff,
                                rider.multiplier,
                                rider.duration,
                            ));
                        }
                    }

                    if critical {
                        result.messages.push(format!(
                            "critical! {} takes {damage} damage",
                            target_state.name
                        ));
                    } else {
                        result
                            .messages
                            .push(format!("{} takes {damage} damage", target_state.name));
                    }
                    result.target_changes.push(change);
                }
            }
        }

        if !any_hit {
            let reason = if any_evaded { "evaded" } else { "missed" };
            result.success = false;
            result.failure_reason = Some(reason.to_owned());
            // Only the actor's resource cost survives a whiff.
            result.target_changes.retain(|c| c.evaded);
            result.messages.push(format!("the attack is {reason}"));
        }
    }

    fn execute_heal(
        params: &HealParams,
        actor_state: &CombatState,
        targets: &[ParticipantKey],
        participants: &HashMap<ParticipantKey, CombatState>,
        result: &mut BattleActionResult,
    ) -> Result<(), DomainError> {
        if params.heal_hp_amount == 0 && params.heal_mp_amount == 0 {
            return Err(DomainError::Validation(format!(
                "heal action {} restores nothing",
                actor_state.name
            )));
        }

        for key in targets {
            let Some(target_state) = participants.get(key) else {
                continue;
            };
            let mut change = TargetStateChange::neutral(*key);
            change.hp_delta = i64::from(params.heal_hp_amount);
            change.mp_delta = i64::from(params.heal_mp_amount);
            change.remove_status_effects = params
                .cures_status
                .iter()
                .filter(|effect| target_state.has_status(**effect))
                .copied()
                .collect();
            change.remove_buffs = params
                .removes_buffs
                .iter()
                .filter(|buff| target_state.buffs.contains_key(buff))
                .copied()
                .collect();

            if params.heal_hp_amount > 0 {
                result.messages.push(format!(
                    "{} recovers {} HP",
                    target_state.name, params.heal_hp_amount
                ));
            }
            if params.heal_mp_amount > 0 {
                result.messages.push(format!(
                    "{} recovers {} MP",
                    target_state.name, params.heal_mp_amount
                ));
            }
            result.target_changes.push(change);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_apply_status(
        &self,
        params: &ApplyStatusParams,
        actor_state: &CombatState,
        targets: &[ParticipantKey],
        participants: &HashMap<ParticipantKey, CombatState>,
        battle_logic: &BattleLogic,
        rng: &mut dyn DeterministicRng,
        result: &mut BattleActionResult,
    ) {
        let mut any_hit = false;
        let mut any_evaded = false;

        for key in targets {
            let Some(target_state) = participants.get(key) else {
                continue;
            };
            match battle_logic
                .hit_resolver
                .resolve_hit(actor_state, target_state, params.hit_rate, rng)
            {
                HitOutcome::Missed => {}
                HitOutcome::Evaded => {
                    any_evaded = true;
                    result.target_changes.push(TargetStateChange::evaded(*key));
                    result
                        .messages
                        .push(format!("{} evades the attempt", target_state.name));
                }
                HitOutcome::Hit { .. } => {
                    any_hit = true;
                    let mut change = TargetStateChange::neutral(*key);
                    for rider in &params.effects {
                        if rng.next_f64() < rider.chance {
                            change
                                .add_status_effects
                                .push(StatusEffectState::new(rider.effect, rider.duration));
                            result.messages.push(format!(
                                "{} is afflicted by {:?}",
                                target_state.name, rider.effect
                            ));
                        }
                    }
                    result.target_changes.push(change);
                }
            }
        }

        if !any_hit {
            let reason = if any_evaded { "evaded" } else { "missed" };
            result.success = false;
            result.failure_reason = Some(reason.to_owned());
            result.target_changes.retain(|c| c.evaded);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_apply_buff(
        &self,
        params: &ApplyBuffParams,
        actor_state: &CombatState,
        targets: &[ParticipantKey],
        participants: &HashMap<ParticipantKey, CombatState>,
        battle_logic: &BattleLogic,
        rng: &mut dyn DeterministicRng,
        result: &mut BattleActionResult,
    ) {
        let mut any_hit = false;
        let mut any_evaded = false;

        for key in targets {
            let Some(target_state) = participants.get(key) else {
                continue;
            };
            // Buffs on allies (including self) never face evasion.
            let outcome = if target_state.participant_type == actor_state.participant_type {
                HitOutcome::Hit { critical: false }
            } else {
                battle_logic
                    .hit_resolver
                    .resolve_hit(actor_state, target_state, params.hit_rate, rng)
            };
            match outcome {
                HitOutcome::Missed => {}
                HitOutcome::Evaded => {
                    any_evaded = true;
                    result.target_changes.push(TargetStateChange::evaded(*key));
                }
                HitOutcome::Hit { .. } => {
                    any_hit = true;
                    let mut change = TargetStateChange::neutral(*key);
                    for rider in &params.buffs {
                        if rng.next_f64() < rider.chance {
                            change.add_buffs.push(BuffState::new(
                                rider.buff,
                                rider.multiplier,
                                rider.duration,
                            ));
                            result.messages.push(format!(
                                "{}'s {:?} changes",
                                target_state.name, rider.buff
                            ));
                        }
                    }
                    result.target_changes.push(change);
                }
            }
        }

        if !any_hit {
            let reason = if any_evaded { "evaded" } else { "missed" };
            result.success = false;
            result.failure_reason = Some(reason.to_owned());
            result.target_changes.retain(|c| c.evaded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::combat_state::{BoundedValue, CombatStats, ParticipantType};

    struct ScriptedRng {
        values: Vec<f64>,
        index: usize,
    }

    impl ScriptedRng {
        fn new(values: Vec<f64>) -> Self {
            Self { values, index: 0 }
        }
    }

    impl DeterministicRng for ScriptedRng {
        fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
            min
        }

        fn next_f64(&mut self) -> f64 {
            let value = self.values.get(self.index).copied().unwrap_or(0.0);
            self.index += 1;
            value
        }
    }

    fn combatant(
        participant_type: ParticipantType,
        attack: u32,
        defense: u32,
        evasion_rate: f64,
    ) -> CombatState {
        CombatState::new(
            Uuid::new_v4(),
            participant_type,
            match participant_type {
                ParticipantType::Player => "hero".to_owned(),
                ParticipantType::Monster => "wolf".to_owned(),
            },
            Race::Human,
            Element::Neutral,
            BoundedValue::new(100, 100),
            BoundedValue::new(50, 50),
            CombatStats {
                attack,
                defense,
                speed: 10,
                critical_rate: 0.0,
                evasion_rate,
            },
            vec![],
        )
    }

    fn basic_attack() -> ActionDefinition {
        ActionDefinition {
            id: Uuid::new_v4(),
            name: "Strike".to_owned(),
            action_type: ActionType::Physical,
            mp_cost: 0,
            hp_cost: 0,
            default_targets: TargetPolicy::FirstEnemy,
            kind: ActionKind::Attack(AttackParams {
                damage_multiplier: 1.0,
                hit_rate: None,
                element: None,
                race_multipliers: vec![],
                status_riders: vec![],
                buff_riders: vec![],
            }),
        }
    }

    fn as_map(states: Vec<CombatState>) -> HashMap<ParticipantKey, CombatState> {
        states.into_iter().map(|s| (s.key(), s)).collect()
    }

    #[test]
    fn test_basic_attack_deals_attack_minus_defense() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let target = combatant(ParticipantType::Monster, 0, 30, 0.0);
        let actor_key = actor.key();
        let target_key = target.key();
        let participants = as_map(vec![actor, target]);
        let action = BattleAction::new(basic_attack(), actor_key, vec![target_key]);
        let mut rng = ScriptedRng::new(vec![0.9, 0.9]);

        let result = action
            .execute(&participants, &BattleLogic::default(), &mut rng)
            .unwrap();

        assert!(result.success);
        assert_eq!(result.target_changes.len(), 1);
        assert_eq!(result.target_changes[0].hp_delta, -20);
        assert!(!result.target_changes[0].critical);
    }

    #[test]
    fn test_attack_against_full_evasion_fails_as_evaded() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let target = combatant(ParticipantType::Monster, 0, 30, 1.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor, target]);
        let action = BattleAction::new(basic_attack(), actor_key, vec![]);
        let mut rng = ScriptedRng::new(vec![0.5]);

        let result = action
            .execute(&participants, &BattleLogic::default(), &mut rng)
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.failure_reason.as_deref(), Some("evaded"));
        assert_eq!(result.total_damage(), 0);
    }

    #[test]
    fn test_attack_with_low_hit_rate_fails_as_missed() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let target = combatant(ParticipantType::Monster, 0, 30, 0.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor, target]);
        let mut definition = basic_attack();
        if let ActionKind::Attack(params) = &mut definition.kind {
            params.hit_rate = Some(0.1);
        }
        let action = BattleAction::new(definition, actor_key, vec![]);
        let mut rng = ScriptedRng::new(vec![0.95]);

        let result = action
            .execute(&participants, &BattleLogic::default(), &mut rng)
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.failure_reason.as_deref(), Some("missed"));
        assert!(result.target_changes.is_empty());
    }

    #[test]
    fn test_mp_cost_is_validated_and_consumed() {
        let mut actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        actor = actor.with_mp_consumed(45); // 5 MP left
        let target = combatant(ParticipantType::Monster, 0, 30, 0.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor, target]);

        let mut definition = basic_attack();
        definition.mp_cost = 10;
        let action = BattleAction::new(definition.clone(), actor_key, vec![]);
        let err = action
            .execute(&participants, &BattleLogic::default(), &mut ScriptedRng::new(vec![]))
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientMp {
                required: 10,
                available: 5
            }
        ));

        definition.mp_cost = 5;
        let action = BattleAction::new(definition, actor_key, vec![]);
        let result = action
            .execute(
                &participants,
                &BattleLogic::default(),
                &mut ScriptedRng::new(vec![0.9, 0.9]),
            )
            .unwrap();
        assert_eq!(result.actor_change.mp_delta, -5);
    }

    #[test]
    fn test_silence_blocks_magic_but_not_physical() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0)
            .with_status_effect(StatusEffectType::Silence, 2);
        let target = combatant(ParticipantType::Monster, 0, 30, 0.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor, target]);

        let mut magic = basic_attack();
        magic.action_type = ActionType::Magic;
        let err = BattleAction::new(magic, actor_key, vec![])
            .execute(&participants, &BattleLogic::default(), &mut ScriptedRng::new(vec![]))
            .unwrap_err();
        assert!(matches!(err, DomainError::Silenced(_)));

        let physical = BattleAction::new(basic_attack(), actor_key, vec![]);
        let result = physical
            .execute(
                &participants,
                &BattleLogic::default(),
                &mut ScriptedRng::new(vec![0.9, 0.9]),
            )
            .unwrap();
        assert!(result.success);
    }

    #[test]
    fn test_attack_status_rider_applies_on_chance_success() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let target = combatant(ParticipantType::Monster, 0, 30, 0.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor, target]);
        let mut definition = basic_attack();
        if let ActionKind::Attack(params) = &mut definition.kind {
            params.status_riders.push(StatusRider {
                effect: StatusEffectType::Poison,
                duration: 3,
                chance: 0.5,
            });
        }
        let action = BattleAction::new(definition, actor_key, vec![]);
        // evasion roll, critical roll, rider roll (0.2 < 0.5 applies).
        let mut rng = ScriptedRng::new(vec![0.9, 0.9, 0.2]);

        let result = action
            .execute(&participants, &BattleLogic::default(), &mut rng)
            .unwrap();

        let change = &result.target_changes[0];
        assert_eq!(change.add_status_effects.len(), 1);
        assert_eq!(change.add_status_effects[0].effect, StatusEffectType::Poison);
        assert_eq!(change.add_status_effects[0].duration, 3);
    }

    #[test]
    fn test_heal_produces_positive_deltas_and_cures() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let ally = combatant(ParticipantType::Player, 10, 10, 0.0)
            .with_status_effect(StatusEffectType::Poison, 3);
        let actor_key = actor.key();
        let ally_key = ally.key();
        let participants = as_map(vec![actor, ally]);
        let definition = ActionDefinition {
            id: Uuid::new_v4(),
            name: "Mend".to_owned(),
            action_type: ActionType::Magic,
            mp_cost: 4,
            hp_cost: 0,
            default_targets: TargetPolicy::AllAllies,
            kind: ActionKind::Heal(HealParams {
                heal_hp_amount: 25,
                heal_mp_amount: 0,
                cures_status: vec![StatusEffectType::Poison],
                removes_buffs: vec![],
            }),
        };
        let action = BattleAction::new(definition, actor_key, vec![ally_key]);

        let result = action
            .execute(&participants, &BattleLogic::default(), &mut ScriptedRng::new(vec![]))
            .unwrap();

        assert!(result.success);
        let change = &result.target_changes[0];
        assert_eq!(change.hp_delta, 25);
        assert_eq!(change.remove_status_effects, vec![StatusEffectType::Poison]);
    }

    #[test]
    fn test_heal_with_no_amounts_is_rejected() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor]);
        let definition = ActionDefinition {
            id: Uuid::new_v4(),
            name: "Hollow Prayer".to_owned(),
            action_type: ActionType::Magic,
            mp_cost: 0,
            hp_cost: 0,
            default_targets: TargetPolicy::SelfOnly,
            kind: ActionKind::Heal(HealParams {
                heal_hp_amount: 0,
                heal_mp_amount: 0,
                cures_status: vec![],
                removes_buffs: vec![],
            }),
        };
        let action = BattleAction::new(definition, actor_key, vec![]);

        let err = action
            .execute(&participants, &BattleLogic::default(), &mut ScriptedRng::new(vec![]))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_defend_sets_actor_flag_without_targets() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor]);
        let definition = ActionDefinition {
            id: Uuid::new_v4(),
            name: "Guard".to_owned(),
            action_type: ActionType::Physical,
            mp_cost: 0,
            hp_cost: 0,
            default_targets: TargetPolicy::SelfOnly,
            kind: ActionKind::Defend,
        };
        let action = BattleAction::new(definition, actor_key, vec![]);

        let result = action
            .execute(&participants, &BattleLogic::default(), &mut ScriptedRng::new(vec![]))
            .unwrap();

        assert!(result.success);
        assert_eq!(result.actor_change.set_defending, Some(true));
        assert!(result.target_changes.is_empty());
    }

    #[test]
    fn test_apply_buff_to_self_skips_evasion() {
        let actor = combatant(ParticipantType::Player, 50, 0, 1.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor]);
        let definition = ActionDefinition {
            id: Uuid::new_v4(),
            name: "War Cry".to_owned(),
            action_type: ActionType::Physical,
            mp_cost: 0,
            hp_cost: 0,
            default_targets: TargetPolicy::SelfOnly,
            kind: ActionKind::ApplyBuff(ApplyBuffParams {
                hit_rate: None,
                buffs: vec![BuffRider {
                    buff: BuffType::Attack,
                    multiplier: 1.5,
                    duration: 3,
                    chance: 1.0,
                }],
            }),
        };
        let action = BattleAction::new(definition, actor_key, vec![]);
        let mut rng = ScriptedRng::new(vec![0.99]);

        let result = action
            .execute(&participants, &BattleLogic::default(), &mut rng)
            .unwrap();

        assert!(result.success);
        assert_eq!(result.target_changes[0].add_buffs.len(), 1);
    }

    #[test]
    fn test_apply_status_respects_apply_rate() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let target = combatant(ParticipantType::Monster, 0, 30, 0.0);
        let actor_key = actor.key();
        let participants = as_map(vec![actor, target]);
        let definition = ActionDefinition {
            id: Uuid::new_v4(),
            name: "Hex".to_owned(),
            action_type: ActionType::Magic,
            mp_cost: 0,
            hp_cost: 0,
            default_targets: TargetPolicy::FirstEnemy,
            kind: ActionKind::ApplyStatus(ApplyStatusParams {
                hit_rate: None,
                effects: vec![StatusRider {
                    effect: StatusEffectType::Curse,
                    duration: 3,
                    chance: 0.5,
                }],
            }),
        };
        let action = BattleAction::new(definition, actor_key, vec![]);
        // evasion roll 0.9 (hit), critical roll 0.9 (no crit), rider
        // roll 0.8 (0.8 >= 0.5, not applied).
        let mut rng = ScriptedRng::new(vec![0.9, 0.9, 0.8]);

        let result = action
            .execute(&participants, &BattleLogic::default(), &mut rng)
            .unwrap();

        assert!(result.success);
        assert!(result.target_changes[0].add_status_effects.is_empty());
    }

    #[test]
    fn test_dead_explicit_target_is_rejected() {
        let actor = combatant(ParticipantType::Player, 50, 0, 0.0);
        let target = combatant(ParticipantType::Monster, 0, 30, 0.0).with_hp_damaged(1000);
        let actor_key = actor.key();
        let target_key = target.key();
        let participants = as_map(vec![actor, target]);
        let action = BattleAction::new(basic_attack(), actor_key, vec![target_key]);

        let err = action
            .execute(&participants, &BattleLogic::default(), &mut ScriptedRng::new(vec![]))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }
}
