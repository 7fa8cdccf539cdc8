//! The battle aggregate root.
//!
//! A battle owns its state machine, the full set of participant combat
//! states, turn order, turn/round counters, accumulated statistics,
//! and a pending event queue. All mutating operations append events
//! that the caller drains and publishes after each step; the aggregate
//! never publishes anything itself. A battle is mutated exclusively by
//! its owning loop task (or by request handlers while the turn is
//! locked), so no interior synchronization lives here.

use std::collections::{HashMap, HashSet};

use emberfall_core::clock::Clock;
use emberfall_core::error::DomainError;
use emberfall_core::event::{DomainEvent, EventMetadata};
use emberfall_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::result::BattleActionResult;
use super::combat_state::{CombatState, ParticipantKey, ParticipantType};
use super::events::{
    ActionExecuted, BattleEnded, BattleEvent, BattleEventKind, BattleStarted, PlayerEscaped,
    PlayerJoined, RoundEnded, RoundStarted, StatisticsEntry, TurnEnded,
};
use super::turn_order::{TurnEntry, TurnOrderService};

/// Battle lifecycle state; transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    /// Created, participants assembling.
    Waiting,
    /// The turn loop is live.
    InProgress,
    /// Terminal.
    Completed,
}

/// Terminal outcome of a battle, from the players' perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleResult {
    /// No monsters remain.
    Victory,
    /// No players remain.
    Defeat,
    /// The round limit was reached.
    Draw,
}

/// Accumulated damage/healing totals for one participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityStatistics {
    /// Damage dealt to others.
    pub damage_dealt: u64,
    /// Damage received.
    pub damage_taken: u64,
    /// Healing performed on others (or self).
    pub healing_done: u64,
}

/// The aggregate root for one battle.
#[derive(Debug, Clone)]
pub struct Battle {
    /// Aggregate identifier.
    pub id: Uuid,
    /// The area spot this battle occupies.
    pub spot_id: Uuid,
    state: BattleState,
    current_turn: u32,
    current_round: u32,
    max_turns: u32,
    max_players: usize,
    turn_index: usize,
    turn_order: Vec<TurnEntry>,
    participants: HashMap<ParticipantKey, CombatState>,
    statistics: HashMap<ParticipantKey, EntityStatistics>,
    escaped_players: HashSet<Uuid>,
    turn_locked: bool,
    result: Option<BattleResult>,
    event_sequence: i64,
    pending_events: Vec<BattleEvent>,
}

impl Battle {
    /// Creates a battle in the waiting state.
    #[must_use]
    pub fn new(id: Uuid, spot_id: Uuid, max_players: usize, max_turns: u32) -> Self {
        Self {
            id,
            spot_id,
            state: BattleState::Waiting,
            current_turn: 0,
            current_round: 0,
            max_turns,
            max_players,
            turn_index: 0,
            turn_order: Vec::new(),
            participants: HashMap::new(),
            statistics: HashMap::new(),
            escaped_players: HashSet::new(),
            turn_locked: false,
            result: None,
            event_sequence: 0,
            pending_events: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BattleState {
        self.state
    }

    /// Whether the battle is live.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.state == BattleState::InProgress
    }

    /// The terminal result, once completed.
    #[must_use]
    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    /// Global turn counter (starts at 0, increments every turn).
    #[must_use]
    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    /// Current round (1-based once started).
    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Configured round limit.
    #[must_use]
    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// The current initiative sequence.
    #[must_use]
    pub fn turn_order(&self) -> &[TurnEntry] {
        &self.turn_order
    }

    /// All current participants.
    #[must_use]
    pub fn participants(&self) -> &HashMap<ParticipantKey, CombatState> {
        &self.participants
    }

    /// One participant's current combat state.
    #[must_use]
    pub fn participant(&self, key: ParticipantKey) -> Option<&CombatState> {
        self.participants.get(&key)
    }

    /// Living players currently in the battle.
    #[must_use]
    pub fn living_players(&self) -> usize {
        self.count_living(ParticipantType::Player)
    }

    /// Living monsters currently in the battle.
    #[must_use]
    pub fn living_monsters(&self) -> usize {
        self.count_living(ParticipantType::Monster)
    }

    /// Players that escaped mid-battle.
    #[must_use]
    pub fn escaped_players(&self) -> &HashSet<Uuid> {
        &self.escaped_players
    }

    /// Accumulated statistics for one participant.
    #[must_use]
    pub fn statistics_for(&self, key: ParticipantKey) -> EntityStatistics {
        self.statistics.get(&key).copied().unwrap_or_default()
    }

    fn count_living(&self, participant_type: ParticipantType) -> usize {
        self.participants
            .values()
            .filter(|s| s.participant_type == participant_type && s.is_alive())
            .count()
    }

    /// Adds a participant while the battle is assembling.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the battle already started, or
    /// `BattleFull` when adding a player beyond the cap.
    pub fn add_participant(&mut self, state: CombatState) -> Result<(), DomainError> {
        if self.state != BattleState::Waiting {
            return Err(DomainError::Validation(
                "participants can only be assembled before the battle starts".to_owned(),
            ));
        }
        if state.participant_type == ParticipantType::Player
            && self.player_slots_taken() >= self.max_players
        {
            return Err(DomainError::BattleFull {
                battle_id: self.id,
                max_players: self.max_players,
            });
        }
        self.participants.insert(state.key(), state);
        Ok(())
    }

    fn player_slots_taken(&self) -> usize {
        self.participants
            .values()
            .filter(|s| s.participant_type == ParticipantType::Player)
            .count()
    }

    /// Transitions `WAITING → IN_PROGRESS`, computes the initial turn
    /// order, and emits battle-started plus round-started events.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when not in the waiting state or when no
    /// participants are present.
    pub fn start_battle(
        &mut self,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.state != BattleState::Waiting {
            return Err(DomainError::Validation(
                "battle has already started".to_owned(),
            ));
        }
        if self.participants.is_empty() {
            return Err(DomainError::Validation(
                "battle cannot start without participants".to_owned(),
            ));
        }

        self.turn_order = TurnOrderService::calculate_initial_turn_order(&self.participants, rng);
        self.turn_index = 0;
        self.current_round = 1;
        self.state = BattleState::InProgress;

        self.push_event(
            BattleEventKind::BattleStarted(BattleStarted {
                battle_id: self.id,
                spot_id: self.spot_id,
                participant_count: self.participants.len(),
            }),
            clock,
        );
        self.push_event(
            BattleEventKind::RoundStarted(RoundStarted {
                battle_id: self.id,
                round: self.current_round,
            }),
            clock,
        );
        Ok(())
    }

    /// The participant whose turn it currently is.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the turn order is empty (battle not yet
    /// started) or the index has overflowed the round.
    pub fn get_current_actor(&self) -> Result<TurnEntry, DomainError> {
        if self.turn_order.is_empty() {
            return Err(DomainError::Validation(
                "battle has no turn order; it has not started".to_owned(),
            ));
        }
        TurnOrderService::get_next_actor(&self.turn_order, self.turn_index)
            .copied()
            .ok_or_else(|| DomainError::Validation("turn index past end of round".to_owned()))
    }

    /// Replaces one participant's combat state.
    ///
    /// # Errors
    ///
    /// Returns `ActorNotFound` when the participant is not in the
    /// battle.
    pub fn update_participant(
        &mut self,
        key: ParticipantKey,
        state: CombatState,
    ) -> Result<(), DomainError> {
        if !self.participants.contains_key(&key) {
            return Err(DomainError::ActorNotFound(key.entity_id));
        }
        self.participants.insert(key, state);
        Ok(())
    }

    /// Folds an executed action's result into the combat states and
    /// statistics, and emits an action-executed event.
    ///
    /// Evaded targets receive no deltas. Each change is applied exactly
    /// once; changes to distinct targets are independent.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the battle is not in progress, or
    /// `ActorNotFound` when the acting participant is missing.
    pub fn apply_action_result(
        &mut self,
        result: &BattleActionResult,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.state != BattleState::InProgress {
            return Err(DomainError::Validation(
                "actions can only be applied while the battle is in progress".to_owned(),
            ));
        }
        let actor_state = self
            .participants
            .get(&result.actor)
            .ok_or(DomainError::ActorNotFound(result.actor.entity_id))?
            .clone();

        // Actor resource costs and defend flag.
        let mut next_actor = actor_state;
        next_actor = Self::shifted(&next_actor, result.actor_change.hp_delta, result.actor_change.mp_delta);
        if let Some(defending) = result.actor_change.set_defending {
            next_actor = if defending {
                next_actor.with_defend()
            } else {
                next_actor.without_defend()
            };
        }
        self.participants.insert(result.actor, next_actor);

        for change in &result.target_changes {
            if change.evaded {
                continue;
            }
            let Some(target_state) = self.participants.get(&change.target) else {
                continue;
            };
            let mut next = Self::shifted(target_state, change.hp_delta, change.mp_delta);
            for status in &change.add_status_effects {
                next = next.with_status_effect(status.effect, status.duration);
            }
            for effect in &change.remove_status_effects {
                next = next.without_status_effect(*effect);
            }
            for buff in &change.add_buffs {
                next = next.with_buff(buff.buff, buff.multiplier, buff.duration);
            }
            for buff in &change.remove_buffs {
                next = next.without_buff(*buff);
            }
            self.participants.insert(change.target, next);

            if change.hp_delta < 0 {
                let amount = change.hp_delta.unsigned_abs();
                self.statistics.entry(result.actor).or_default().damage_dealt += amount;
                self.statistics.entry(change.target).or_default().damage_taken += amount;
            } else if change.hp_delta > 0 {
                let amount = change.hp_delta.unsigned_abs();
                self.statistics.entry(result.actor).or_default().healing_done += amount;
            }
        }

        self.push_event(
            BattleEventKind::ActionExecuted(ActionExecuted {
                battle_id: self.id,
                actor: result.actor,
                action_name: result.action_name.clone(),
                success: result.success,
                failure_reason: result.failure_reason.clone(),
                messages: result.messages.clone(),
            }),
            clock,
        );
        Ok(())
    }

    /// Emits a turn-ended event and advances the initiative index. On
    /// index overflow the round ends: a round-ended event is emitted,
    /// the round counter increments, turn order is recomputed from the
    /// living participants, and a new round-started event follows when
    /// participants remain and the round limit is not exceeded.
    ///
    /// Returns whether the battle continues.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the battle is not in progress.
    pub fn advance_to_next_turn(
        &mut self,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        if self.state != BattleState::InProgress {
            return Err(DomainError::Validation(
                "cannot advance a battle that is not in progress".to_owned(),
            ));
        }

        if let Ok(entry) = self.get_current_actor() {
            self.current_turn += 1;
            self.push_event(
                BattleEventKind::TurnEnded(TurnEnded {
                    battle_id: self.id,
                    actor: entry.key,
                    turn: self.current_turn,
                }),
                clock,
            );
        }
        self.turn_index += 1;

        if self.turn_index >= self.turn_order.len() {
            self.push_event(
                BattleEventKind::RoundEnded(RoundEnded {
                    battle_id: self.id,
                    round: self.current_round,
                }),
                clock,
            );
            self.current_round += 1;
            self.turn_order = TurnOrderService::recalculate_turn_order_for_next_round(
                &self.participants,
                &self.turn_order,
                rng,
            );
            self.turn_index = 0;

            if self.turn_order.is_empty() || self.current_round > self.max_turns {
                return Ok(false);
            }
            self.push_event(
                BattleEventKind::RoundStarted(RoundStarted {
                    battle_id: self.id,
                    round: self.current_round,
                }),
                clock,
            );
        }
        Ok(true)
    }

    /// Checks the battle-end conditions in precedence order: victory
    /// (no monsters), defeat (no players), draw (round limit reached).
    #[must_use]
    pub fn check_battle_end_conditions(&self) -> Option<BattleResult> {
        if self.living_monsters() == 0 {
            return Some(BattleResult::Victory);
        }
        if self.living_players() == 0 {
            return Some(BattleResult::Defeat);
        }
        if self.current_round >= self.max_turns {
            return Some(BattleResult::Draw);
        }
        None
    }

    /// Transitions to `COMPLETED` and emits a battle-ended event
    /// carrying the accumulated statistics.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the battle is not in progress.
    pub fn end_battle(
        &mut self,
        result: BattleResult,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.state != BattleState::InProgress {
            return Err(DomainError::Validation(
                "only an in-progress battle can end".to_owned(),
            ));
        }
        self.state = BattleState::Completed;
        self.result = Some(result);
        self.turn_locked = false;

        let statistics = self
            .statistics
            .iter()
            .map(|(key, totals)| StatisticsEntry {
                participant: *key,
                damage_dealt: totals.damage_dealt,
                damage_taken: totals.damage_taken,
                healing_done: totals.healing_done,
            })
            .collect();
        self.push_event(
            BattleEventKind::BattleEnded(BattleEnded {
                battle_id: self.id,
                result,
                rounds: self.current_round,
                statistics,
            }),
            clock,
        );
        Ok(())
    }

    /// Adds a player mid-battle, bounded by `max_players`. The joiner
    /// enters the turn order at the next round boundary.
    ///
    /// # Errors
    ///
    /// Returns `BattleFull` at the player cap, or `Validation` when the
    /// battle is completed or the entity is already a participant.
    pub fn join_player(
        &mut self,
        state: CombatState,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.state == BattleState::Completed {
            return Err(DomainError::Validation(
                "cannot join a completed battle".to_owned(),
            ));
        }
        if state.participant_type != ParticipantType::Player {
            return Err(DomainError::Validation(
                "only players can join a battle".to_owned(),
            ));
        }
        if self.participants.contains_key(&state.key()) {
            return Err(DomainError::Validation(
                "entity is already in the battle".to_owned(),
            ));
        }
        if self.player_slots_taken() >= self.max_players {
            return Err(DomainError::BattleFull {
                battle_id: self.id,
                max_players: self.max_players,
            });
        }

        let player_id = state.entity_id;
        self.participants.insert(state.key(), state);
        let player_count = self.player_slots_taken();
        self.push_event(
            BattleEventKind::PlayerJoined(PlayerJoined {
                battle_id: self.id,
                player_id,
                player_count,
            }),
            clock,
        );
        Ok(())
    }

    /// Removes a player who escapes mid-battle and emits a
    /// player-escaped event.
    ///
    /// # Errors
    ///
    /// Returns `ActorNotFound` when the player is not a participant.
    pub fn player_escape(&mut self, player_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        let key = ParticipantKey::player(player_id);
        if self.participants.remove(&key).is_none() {
            return Err(DomainError::ActorNotFound(player_id));
        }
        self.escaped_players.insert(player_id);

        // Drop the escapee from the current round's remaining turns.
        if let Some(position) = self.turn_order.iter().position(|entry| entry.key == key) {
            self.turn_order.remove(position);
            if position < self.turn_index {
                self.turn_index -= 1;
            }
        }

        self.push_event(
            BattleEventKind::PlayerEscaped(PlayerEscaped {
                battle_id: self.id,
                player_id,
            }),
            clock,
        );
        Ok(())
    }

    /// Locks the current turn while a player resolves an action.
    pub fn lock_turn(&mut self) {
        self.turn_locked = true;
    }

    /// Releases the turn lock.
    pub fn unlock_turn(&mut self) {
        self.turn_locked = false;
    }

    /// Whether the current turn is locked on player input.
    #[must_use]
    pub fn is_turn_locked(&self) -> bool {
        self.turn_locked
    }

    /// Pending domain events, in production order.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.pending_events
    }

    /// Drains the pending event queue, preserving order.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Clears the pending event queue.
    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }

    fn shifted(state: &CombatState, hp_delta: i64, mp_delta: i64) -> CombatState {
        let mut next = state.clone();
        #[allow(clippy::cast_possible_truncation)]
        {
            if hp_delta < 0 {
                next = next.with_hp_damaged(u32::try_from(hp_delta.unsigned_abs()).unwrap_or(u32::MAX));
            } else if hp_delta > 0 {
                next = next.with_hp_healed(u32::try_from(hp_delta.unsigned_abs()).unwrap_or(u32::MAX));
            }
            if mp_delta < 0 {
                next = next.with_mp_consumed(u32::try_from(mp_delta.unsigned_abs()).unwrap_or(u32::MAX));
            } else if mp_delta > 0 {
                next = next.with_mp_healed(u32::try_from(mp_delta.unsigned_abs()).unwrap_or(u32::MAX));
            }
        }
        next
    }

    fn push_event(&mut self, kind: BattleEventKind, clock: &dyn Clock) {
        self.event_sequence += 1;
        let mut event = BattleEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: String::new(),
                aggregate_id: self.id,
                sequence_number: self.event_sequence,
                occurred_at: clock.now(),
            },
            kind,
        };
        event.metadata.event_type = event.event_type().to_owned();
        self.pending_events.push(event);
    }
}
