//! Battle orchestration service.
//!
//! Sits between transport and domain: loads aggregates from the
//! repositories, invokes domain operations, persists the outcome, and
//! fans out drained events and player notifications. The battle loop
//! drives turns exclusively through this service, so every state
//! mutation funnels through one code path.

use std::sync::Arc;

use emberfall_core::clock::Clock;
use emberfall_core::error::DomainError;
use emberfall_core::event::{EventPublisher, OutboundEvent};
use emberfall_core::notifier::Notifier;
use emberfall_core::rng::DeterministicRng;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::application::monster::MonsterActionStrategy;
use crate::application::waiter::{PlayerActionWaiter, WaiterStatistics};
use crate::domain::action::logic::BattleLogic;
use crate::domain::action::{ActionDefinition, BattleAction};
use crate::domain::action::result::BattleActionResult;
use crate::domain::battle::{Battle, BattleResult, BattleState};
use crate::domain::combat_state::{
    CombatState, ParticipantKey, ParticipantType, StatusEffectState,
};
use crate::domain::commands::{ExecutePlayerAction, JoinBattle, LeaveBattle, StartBattle};
use crate::domain::repositories::{
    ActionRepository, AreaRepository, BattleRepository, MonsterRepository, PlayerRepository,
};
use crate::domain::turn_processor::TurnProcessor;

/// What the battle loop should do after one call to
/// [`BattleService::process_next_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The current actor is a player; the loop must wait for their
    /// action before calling [`BattleService::finish_turn`].
    AwaitingPlayer {
        /// The player the loop is waiting on.
        player_id: Uuid,
    },
    /// The turn was fully processed; the loop proceeds to the next.
    Continue,
    /// The battle reached a terminal state.
    Completed(BattleResult),
}

/// Serializable view of one participant for status queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParticipantView {
    /// Entity identifier.
    pub entity_id: Uuid,
    /// Player or monster.
    pub participant_type: ParticipantType,
    /// Display name.
    pub name: String,
    /// Current HP.
    pub hp: u32,
    /// HP ceiling.
    pub max_hp: u32,
    /// Current MP.
    pub mp: u32,
    /// MP ceiling.
    pub max_mp: u32,
    /// Whether the participant is alive.
    pub is_alive: bool,
    /// Whether the participant is holding a defend stance.
    pub is_defending: bool,
    /// Active status effects.
    pub status_effects: Vec<StatusEffectState>,
}

/// Serializable battle status snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BattleStatus {
    /// The battle identifier.
    pub battle_id: Uuid,
    /// The spot the battle occupies.
    pub spot_id: Uuid,
    /// Lifecycle state.
    pub state: BattleState,
    /// Terminal outcome, once completed.
    pub result: Option<BattleResult>,
    /// Current round number.
    pub current_round: u32,
    /// Global turn counter.
    pub current_turn: u32,
    /// Living players.
    pub player_count: usize,
    /// Living monsters.
    pub monster_count: usize,
    /// Initiative order for the current round.
    pub turn_order: Vec<ParticipantKey>,
    /// All participants.
    pub participants: Vec<ParticipantView>,
}

/// Application service orchestrating the combat context.
pub struct BattleService {
    battles: Arc<dyn BattleRepository>,
    actions: Arc<dyn ActionRepository>,
    players: Arc<dyn PlayerRepository>,
    monsters: Arc<dyn MonsterRepository>,
    areas: Arc<dyn AreaRepository>,
    publisher: Arc<dyn EventPublisher>,
    notifier: Arc<dyn Notifier>,
    waiter: Arc<PlayerActionWaiter>,
    strategy: Arc<dyn MonsterActionStrategy>,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn DeterministicRng>>,
    logic: BattleLogic,
    processor: TurnProcessor,
}

impl BattleService {
    /// Wires the service to its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        battles: Arc<dyn BattleRepository>,
        actions: Arc<dyn ActionRepository>,
        players: Arc<dyn PlayerRepository>,
        monsters: Arc<dyn MonsterRepository>,
        areas: Arc<dyn AreaRepository>,
        publisher: Arc<dyn EventPublisher>,
        notifier: Arc<dyn Notifier>,
        strategy: Arc<dyn MonsterActionStrategy>,
        clock: Arc<dyn Clock>,
        rng: Box<dyn DeterministicRng>,
    ) -> Self {
        Self {
            battles,
            actions,
            players,
            monsters,
            areas,
            publisher,
            notifier,
            waiter: Arc::new(PlayerActionWaiter::new()),
            strategy,
            clock,
            rng: Mutex::new(rng),
            logic: BattleLogic::default(),
            processor: TurnProcessor,
        }
    }

    /// The waiter shared with the battle loop.
    #[must_use]
    pub fn waiter(&self) -> Arc<PlayerActionWaiter> {
        Arc::clone(&self.waiter)
    }

    /// Current waiter gauge values.
    pub async fn waiter_statistics(&self) -> WaiterStatistics {
        self.waiter.statistics().await
    }

    /// Starts a new battle at `spot_id` with `player_id` as the first
    /// participant, spawning the spot's configured monsters.
    ///
    /// # Errors
    ///
    /// Returns `AreaNotFound` for an unknown spot, `BattleAlreadyExists`
    /// when the spot is occupied, and `ActorNotFound` for an unknown
    /// player.
    pub async fn start_battle(&self, command: &StartBattle) -> Result<Uuid, DomainError> {
        let spot = self
            .areas
            .find_spot(command.spot_id)
            .await?
            .ok_or(DomainError::AreaNotFound(command.spot_id))?;

        if self.battles.find_by_spot_id(command.spot_id).await?.is_some() {
            return Err(DomainError::BattleAlreadyExists(command.spot_id));
        }

        let player = self
            .players
            .find_by_id(command.player_id)
            .await?
            .ok_or(DomainError::ActorNotFound(command.player_id))?;

        let battle_id = Uuid::new_v4();
        let mut battle = Battle::new(battle_id, command.spot_id, spot.max_players, spot.max_turns);
        battle.add_participant(player.into_combat_state())?;

        for monster_id in &spot.monster_ids {
            let template = self
                .monsters
                .find_by_id(*monster_id)
                .await?
                .ok_or(DomainError::ActorNotFound(*monster_id))?;
            battle.add_participant(template.into_combat_state(Uuid::new_v4()))?;
        }

        {
            let mut rng = self.rng.lock().await;
            battle.start_battle(rng.as_mut(), self.clock.as_ref())?;
        }

        self.battles.save(&battle).await?;
        self.publish_drained(&mut battle).await;
        Ok(battle_id)
    }

    /// Adds a player to a running battle. The joiner enters the turn
    /// order at the next round boundary.
    ///
    /// # Errors
    ///
    /// Returns `BattleNotFound`, `ActorNotFound`, or `BattleFull`.
    pub async fn join_battle(&self, command: &JoinBattle) -> Result<(), DomainError> {
        let mut battle = self.load(command.battle_id).await?;
        let player = self
            .players
            .find_by_id(command.player_id)
            .await?
            .ok_or(DomainError::ActorNotFound(command.player_id))?;

        battle.join_player(player.into_combat_state(), self.clock.as_ref())?;
        self.battles.save(&battle).await?;
        self.publish_drained(&mut battle).await;
        Ok(())
    }

    /// Removes an escaping player from a running battle.
    ///
    /// # Errors
    ///
    /// Returns `BattleNotFound` or `ActorNotFound`.
    pub async fn leave_battle(&self, command: &LeaveBattle) -> Result<(), DomainError> {
        let mut battle = self.load(command.battle_id).await?;
        battle.player_escape(command.player_id, self.clock.as_ref())?;
        self.battles.save(&battle).await?;
        self.publish_drained(&mut battle).await;

        // An escape may leave the loop parked on this player.
        self.waiter
            .complete_action(command.battle_id, command.player_id)
            .await;
        Ok(())
    }

    /// Executes an action submitted by a player whose turn it is.
    ///
    /// Action-legality failures (insufficient MP or HP, silence) are
    /// converted into a failed [`BattleActionResult`] so the turn is
    /// still consumed; all other errors propagate.
    ///
    /// # Errors
    ///
    /// Returns `BattleNotFound`, `BattleNotInProgress`, `InvalidTurn`,
    /// or `Validation` for unknown or unlearned actions.
    pub async fn execute_player_action(
        &self,
        command: ExecutePlayerAction,
    ) -> Result<BattleActionResult, DomainError> {
        let mut battle = self.load(command.battle_id).await?;
        if !battle.is_in_progress() {
            return Err(DomainError::BattleNotInProgress {
                battle_id: command.battle_id,
            });
        }
        if battle.is_turn_locked() {
            return Err(DomainError::Validation(
                "battle is processing another turn".to_owned(),
            ));
        }

        let actor = ParticipantKey::player(command.player_id);
        let current = battle.get_current_actor()?;
        if current.key != actor {
            return Err(DomainError::InvalidTurn {
                battle_id: command.battle_id,
                actor_id: command.player_id,
            });
        }

        let state = battle
            .participant(actor)
            .ok_or(DomainError::ActorNotFound(command.player_id))?;
        if !state.available_action_ids.contains(&command.action_id) {
            return Err(DomainError::Validation(format!(
                "player {} has not learned action {}",
                command.player_id, command.action_id
            )));
        }
        let definition = self.actions.find_by_id(command.action_id).await?.ok_or_else(|| {
            DomainError::Validation(format!("unknown action {}", command.action_id))
        })?;

        let result = self
            .execute_action(&mut battle, definition, actor, command.targets)
            .await?;

        // The lock persists until the loop finishes the turn, so a
        // repeat submission in the same turn fails the check above.
        battle.lock_turn();
        self.battles.save(&battle).await?;
        self.publish_drained(&mut battle).await;
        self.notify_participants(&battle, &result.messages).await;

        // Wake the loop parked on this player.
        self.waiter
            .complete_action(command.battle_id, command.player_id)
            .await;
        Ok(result)
    }

    /// Processes the start of the current turn and, for monsters, the
    /// whole turn. Called only by the battle loop.
    ///
    /// # Errors
    ///
    /// Returns `BattleNotFound`; a battle that is no longer in progress
    /// yields `TurnOutcome::Completed`.
    pub async fn process_next_turn(&self, battle_id: Uuid) -> Result<TurnOutcome, DomainError> {
        let mut battle = self.load(battle_id).await?;
        if let Some(result) = battle.result() {
            return Ok(TurnOutcome::Completed(result));
        }

        battle.lock_turn();
        let actor = battle.get_current_actor()?;

        let start = {
            let mut rng = self.rng.lock().await;
            self.processor
                .process_turn_start(&mut battle, actor.key, rng.as_mut())?
        };
        self.notify_participants(&battle, &start.messages).await;

        if start.actor_died || !start.can_act {
            let outcome = self.close_turn(&mut battle, actor.key).await?;
            self.battles.save(&battle).await?;
            self.publish_drained(&mut battle).await;
            return Ok(outcome);
        }

        match actor.key.participant_type {
            ParticipantType::Player => {
                battle.unlock_turn();
                self.waiter
                    .register(battle_id, actor.key.entity_id)
                    .await;
                self.battles.save(&battle).await?;
                self.publish_drained(&mut battle).await;
                Ok(TurnOutcome::AwaitingPlayer {
                    player_id: actor.key.entity_id,
                })
            }
            ParticipantType::Monster => {
                if let Err(error) = self.run_monster_turn(&mut battle, actor.key).await {
                    // A misbehaving monster never takes the loop down;
                    // its turn is forfeited.
                    warn!(
                        battle_id = %battle_id,
                        monster_id = %actor.key.entity_id,
                        error = %error,
                        "monster action failed, skipping turn"
                    );
                }
                let outcome = self.close_turn(&mut battle, actor.key).await?;
                self.battles.save(&battle).await?;
                self.publish_drained(&mut battle).await;
                Ok(outcome)
            }
        }
    }

    /// Finishes the current turn after a player acted or timed out.
    /// Called only by the battle loop.
    ///
    /// # Errors
    ///
    /// Returns `BattleNotFound`.
    pub async fn finish_turn(
        &self,
        battle_id: Uuid,
        actor: ParticipantKey,
    ) -> Result<TurnOutcome, DomainError> {
        let mut battle = self.load(battle_id).await?;
        if let Some(result) = battle.result() {
            return Ok(TurnOutcome::Completed(result));
        }

        battle.lock_turn();
        let outcome = self.close_turn(&mut battle, actor).await?;
        self.battles.save(&battle).await?;
        self.publish_drained(&mut battle).await;
        Ok(outcome)
    }

    /// Read-only battle status snapshot.
    ///
    /// # Errors
    ///
    /// Returns `BattleNotFound`.
    pub async fn battle_status(&self, battle_id: Uuid) -> Result<BattleStatus, DomainError> {
        let battle = self.load(battle_id).await?;
        let mut participants: Vec<ParticipantView> = battle
            .participants()
            .values()
            .map(|state| ParticipantView {
                entity_id: state.entity_id,
                participant_type: state.participant_type,
                name: state.name.clone(),
                hp: state.hp.value(),
                max_hp: state.hp.max(),
                mp: state.mp.value(),
                max_mp: state.mp.max(),
                is_alive: state.is_alive(),
                is_defending: state.is_defending,
                status_effects: state.status_effects.values().copied().collect(),
            })
            .collect();
        participants.sort_by_key(|view| view.entity_id);

        Ok(BattleStatus {
            battle_id: battle.id,
            spot_id: battle.spot_id,
            state: battle.state(),
            result: battle.result(),
            current_round: battle.current_round(),
            current_turn: battle.current_turn(),
            player_count: battle.living_players(),
            monster_count: battle.living_monsters(),
            turn_order: battle.turn_order().iter().map(|entry| entry.key).collect(),
            participants,
        })
    }

    /// Releases every resource tied to a battle: pending waiter
    /// entries and the stored aggregate. Called by the loop on exit.
    pub async fn cleanup_battle(&self, battle_id: Uuid) {
        self.waiter.cancel_battle(battle_id).await;
        if let Err(error) = self.battles.delete(battle_id).await {
            warn!(battle_id = %battle_id, error = %error, "battle cleanup failed");
        }
    }

    async fn load(&self, battle_id: Uuid) -> Result<Battle, DomainError> {
        self.battles
            .find_by_id(battle_id)
            .await?
            .ok_or(DomainError::BattleNotFound(battle_id))
    }

    /// Executes a bound action, converting legality failures into a
    /// failed result, and applies a successful result to the battle.
    async fn execute_action(
        &self,
        battle: &mut Battle,
        definition: ActionDefinition,
        actor: ParticipantKey,
        targets: Vec<ParticipantKey>,
    ) -> Result<BattleActionResult, DomainError> {
        let action = BattleAction::new(definition, actor, targets);
        let executed = {
            let mut rng = self.rng.lock().await;
            action.execute(battle.participants(), &self.logic, rng.as_mut())
        };

        let result = match executed {
            Ok(result) => result,
            Err(error) if error.is_action_legality() => BattleActionResult::failed(
                action.definition.id,
                action.definition.name.clone(),
                actor,
                &error.to_string(),
            ),
            Err(error) => return Err(error),
        };

        battle.apply_action_result(&result, self.clock.as_ref())?;
        Ok(result)
    }

    /// Runs a monster's turn: pick an action via the strategy and
    /// execute it. A monster with no affordable action skips.
    async fn run_monster_turn(
        &self,
        battle: &mut Battle,
        actor: ParticipantKey,
    ) -> Result<(), DomainError> {
        let state = battle
            .participant(actor)
            .ok_or(DomainError::ActorNotFound(actor.entity_id))?
            .clone();
        let actions = self.actions.find_by_ids(&state.available_action_ids).await?;

        let opponents: Vec<&CombatState> = battle
            .participants()
            .values()
            .filter(|p| p.participant_type == ParticipantType::Player && p.is_alive())
            .collect();

        let chosen = {
            let mut rng = self.rng.lock().await;
            self.strategy
                .choose_action(&state, &actions, &opponents, rng.as_mut())
        };
        drop(opponents);

        if let Some(chosen) = chosen {
            let result = self
                .execute_action(battle, chosen.definition, actor, chosen.targets)
                .await?;
            self.notify_participants(battle, &result.messages).await;
        }
        Ok(())
    }

    /// Turn-end effects, end-condition check, and turn advancement.
    async fn close_turn(
        &self,
        battle: &mut Battle,
        actor: ParticipantKey,
    ) -> Result<TurnOutcome, DomainError> {
        if battle.participant(actor).is_none() {
            // The actor escaped mid-turn; the escape already
            // repositioned the turn order, so no extra advancement.
            if let Some(result) = self
                .processor
                .check_and_handle_battle_end(battle, self.clock.as_ref())?
            {
                return Ok(TurnOutcome::Completed(result));
            }
            battle.unlock_turn();
            return Ok(TurnOutcome::Continue);
        }

        let end = self.processor.process_turn_end(battle, actor)?;
        self.notify_participants(battle, &end.messages).await;

        if let Some(result) = self
            .processor
            .check_and_handle_battle_end(battle, self.clock.as_ref())?
        {
            return Ok(TurnOutcome::Completed(result));
        }

        let advanced = {
            let mut rng = self.rng.lock().await;
            self.processor
                .advance_turn(battle, rng.as_mut(), self.clock.as_ref())?
        };

        if !advanced {
            // The round limit was hit or nobody is left to act.
            let result = battle.check_battle_end_conditions().unwrap_or(BattleResult::Draw);
            battle.end_battle(result, self.clock.as_ref())?;
            return Ok(TurnOutcome::Completed(result));
        }

        battle.unlock_turn();
        Ok(TurnOutcome::Continue)
    }

    async fn publish_drained(&self, battle: &mut Battle) {
        let events = battle.drain_events();
        if events.is_empty() {
            return;
        }
        let outbound: Vec<OutboundEvent> = events
            .iter()
            .map(|event| OutboundEvent::from_event(event))
            .collect();
        self.publisher.publish_all(outbound).await;
    }

    async fn notify_participants(&self, battle: &Battle, messages: &[String]) {
        if messages.is_empty() {
            return;
        }
        let player_ids: Vec<Uuid> = battle
            .participants()
            .values()
            .filter(|p| p.participant_type == ParticipantType::Player)
            .map(|p| p.entity_id)
            .collect();
        for message in messages {
            self.notifier.notify_players(&player_ids, message).await;
        }
    }
}

impl std::fmt::Debug for BattleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleService").finish_non_exhaustive()
    }
}
