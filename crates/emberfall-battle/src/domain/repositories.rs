//! Collaborator interfaces for the combat context.
//!
//! The battle loop only ever talks to these traits; concrete
//! implementations live in the store crate, and tests use in-crate
//! doubles. Entity data crosses the boundary as snapshots, which the
//! battle converts into `CombatState` on entry.

use async_trait::async_trait;
use emberfall_core::error::DomainError;
use uuid::Uuid;

use super::action::ActionDefinition;
use super::battle::Battle;
use super::combat_state::{
    BoundedValue, CombatState, CombatStats, Element, ParticipantType, Race,
};

/// Entity data a player contributes when entering a battle.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    /// The player's entity identifier.
    pub player_id: Uuid,
    /// Display name.
    pub name: String,
    /// The player's race.
    pub race: Race,
    /// The player's elemental affinity.
    pub element: Element,
    /// Current HP at snapshot time.
    pub current_hp: u32,
    /// HP ceiling.
    pub max_hp: u32,
    /// Current MP at snapshot time.
    pub current_mp: u32,
    /// MP ceiling.
    pub max_mp: u32,
    /// Combat stat block.
    pub stats: CombatStats,
    /// Actions this player has learned.
    pub action_ids: Vec<Uuid>,
}

impl PlayerSnapshot {
    /// Converts the snapshot into battle-local combat state.
    #[must_use]
    pub fn into_combat_state(self) -> CombatState {
        CombatState::new(
            self.player_id,
            ParticipantType::Player,
            self.name,
            self.race,
            self.element,
            BoundedValue::new(self.current_hp, self.max_hp),
            BoundedValue::new(self.current_mp, self.max_mp),
            self.stats,
            self.action_ids,
        )
    }
}

/// Template data a monster contributes when spawned into a battle.
///
/// Monsters always spawn at full HP and MP.
#[derive(Debug, Clone)]
pub struct MonsterSnapshot {
    /// The monster template identifier.
    pub monster_id: Uuid,
    /// Display name.
    pub name: String,
    /// The monster's race.
    pub race: Race,
    /// The monster's elemental affinity.
    pub element: Element,
    /// HP ceiling.
    pub max_hp: u32,
    /// MP ceiling.
    pub max_mp: u32,
    /// Combat stat block.
    pub stats: CombatStats,
    /// Actions this monster can use.
    pub action_ids: Vec<Uuid>,
}

impl MonsterSnapshot {
    /// Converts the snapshot into battle-local combat state. Each spawn
    /// gets a fresh entity identity so duplicate templates can coexist
    /// in one battle.
    #[must_use]
    pub fn into_combat_state(self, entity_id: Uuid) -> CombatState {
        CombatState::new(
            entity_id,
            ParticipantType::Monster,
            self.name,
            self.race,
            self.element,
            BoundedValue::full(self.max_hp),
            BoundedValue::full(self.max_mp),
            self.stats,
            self.action_ids,
        )
    }
}

/// Spawn configuration for one battle spot inside an area.
#[derive(Debug, Clone)]
pub struct SpotConfig {
    /// The spot identifier.
    pub spot_id: Uuid,
    /// Monster templates spawned when a battle starts here.
    pub monster_ids: Vec<Uuid>,
    /// Player cap for battles at this spot.
    pub max_players: usize,
    /// Round cap before the battle is drawn.
    pub max_turns: u32,
}

/// Persistence boundary for battle aggregates.
#[async_trait]
pub trait BattleRepository: Send + Sync {
    /// Loads a battle by its identifier.
    async fn find_by_id(&self, battle_id: Uuid) -> Result<Option<Battle>, DomainError>;

    /// Loads the battle currently occupying a spot, if any.
    async fn find_by_spot_id(&self, spot_id: Uuid) -> Result<Option<Battle>, DomainError>;

    /// Persists the battle's current state.
    async fn save(&self, battle: &Battle) -> Result<(), DomainError>;

    /// Removes a completed battle.
    async fn delete(&self, battle_id: Uuid) -> Result<(), DomainError>;
}

/// Read access to the action catalog.
#[async_trait]
pub trait ActionRepository: Send + Sync {
    /// Loads one action definition.
    async fn find_by_id(&self, action_id: Uuid) -> Result<Option<ActionDefinition>, DomainError>;

    /// Loads several action definitions; unknown identifiers are skipped.
    async fn find_by_ids(&self, action_ids: &[Uuid]) -> Result<Vec<ActionDefinition>, DomainError>;

    /// Looks up the MP and HP costs of an action.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an unknown action.
    async fn get_action_cost(&self, action_id: Uuid) -> Result<(u32, u32), DomainError> {
        let action = self
            .find_by_id(action_id)
            .await?
            .ok_or_else(|| DomainError::Validation(format!("unknown action {action_id}")))?;
        Ok((action.mp_cost, action.hp_cost))
    }
}

/// Read access to player entity data.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Loads the snapshot of a player.
    async fn find_by_id(&self, player_id: Uuid) -> Result<Option<PlayerSnapshot>, DomainError>;
}

/// Read access to monster template data.
#[async_trait]
pub trait MonsterRepository: Send + Sync {
    /// Loads one monster template.
    async fn find_by_id(&self, monster_id: Uuid) -> Result<Option<MonsterSnapshot>, DomainError>;
}

/// Read access to area spawn configuration.
#[async_trait]
pub trait AreaRepository: Send + Sync {
    /// Loads the spawn configuration for a spot.
    async fn find_spot(&self, spot_id: Uuid) -> Result<Option<SpotConfig>, DomainError>;
}
