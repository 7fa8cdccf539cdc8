//! In-crate doubles for application-layer tests.
//!
//! The application tests need the full collaborator set behind the
//! repository traits. Keeping these doubles inside the crate avoids a
//! dependency on the store crate, which itself depends on this one.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use emberfall_core::error::DomainError;
use emberfall_core::event::{EventHandler, EventPublisher, OutboundEvent};
use tokio::sync::RwLock;
use uuid::{Uuid, uuid};

use crate::domain::action::{ActionDefinition, ActionKind, ActionType, AttackParams, TargetPolicy};
use crate::domain::battle::{Battle, BattleState};
use crate::domain::combat_state::{CombatStats, Element, Race};
use crate::domain::repositories::{
    ActionRepository, AreaRepository, BattleRepository, MonsterRepository, MonsterSnapshot,
    PlayerRepository, PlayerSnapshot, SpotConfig,
};

/// Basic physical strike, damage multiplier 1.0.
pub const STRIKE: Uuid = uuid!("7f9d0f10-4b5e-4e66-8f6e-2d51c47a0001");
/// Defend stance.
pub const DEFEND: Uuid = uuid!("7f9d0f10-4b5e-4e66-8f6e-2d51c47a0002");
/// Magic attack with an MP cost.
pub const FIREBALL: Uuid = uuid!("7f9d0f10-4b5e-4e66-8f6e-2d51c47a0003");
/// Monster bite, damage multiplier 1.1.
pub const BITE: Uuid = uuid!("7f9d0f10-4b5e-4e66-8f6e-2d51c47a0004");

fn plain_attack(id: Uuid, name: &str, damage_multiplier: f64) -> ActionDefinition {
    ActionDefinition {
        id,
        name: name.to_owned(),
        action_type: ActionType::Physical,
        mp_cost: 0,
        hp_cost: 0,
        default_targets: TargetPolicy::FirstEnemy,
        kind: ActionKind::Attack(AttackParams {
            damage_multiplier,
            hit_rate: None,
            element: None,
            race_multipliers: vec![],
            status_riders: vec![],
            buff_riders: vec![],
        }),
    }
}

/// A small fixed-id catalog covering the action shapes the tests need.
pub fn catalog() -> Vec<ActionDefinition> {
    vec![
        plain_attack(STRIKE, "Strike", 1.0),
        ActionDefinition {
            id: DEFEND,
            name: "Defend".to_owned(),
            action_type: ActionType::Physical,
            mp_cost: 0,
            hp_cost: 0,
            default_targets: TargetPolicy::SelfOnly,
            kind: ActionKind::Defend,
        },
        ActionDefinition {
            id: FIREBALL,
            name: "Fireball".to_owned(),
            action_type: ActionType::Magic,
            mp_cost: 8,
            hp_cost: 0,
            default_targets: TargetPolicy::FirstEnemy,
            kind: ActionKind::Attack(AttackParams {
                damage_multiplier: 1.6,
                hit_rate: Some(0.95),
                element: Some(Element::Fire),
                race_multipliers: vec![],
                status_riders: vec![],
                buff_riders: vec![],
            }),
        },
        plain_attack(BITE, "Bite", 1.1),
    ]
}

/// A full-health human player snapshot with the given actions.
pub fn player_snapshot(name: &str, speed: u32, action_ids: Vec<Uuid>) -> PlayerSnapshot {
    PlayerSnapshot {
        player_id: Uuid::new_v4(),
        name: name.to_owned(),
        race: Race::Human,
        element: Element::Neutral,
        current_hp: 100,
        max_hp: 100,
        current_mp: 30,
        max_mp: 30,
        stats: CombatStats {
            attack: 20,
            defense: 10,
            speed,
            critical_rate: 0.0,
            evasion_rate: 0.0,
        },
        action_ids,
    }
}

/// A beast monster template with the given actions.
pub fn monster_snapshot(name: &str, speed: u32, action_ids: Vec<Uuid>) -> MonsterSnapshot {
    MonsterSnapshot {
        monster_id: Uuid::new_v4(),
        name: name.to_owned(),
        race: Race::Beast,
        element: Element::Neutral,
        max_hp: 60,
        max_mp: 20,
        stats: CombatStats {
            attack: 15,
            defense: 8,
            speed,
            critical_rate: 0.0,
            evasion_rate: 0.0,
        },
        action_ids,
    }
}

/// Map-backed battle store.
#[derive(Debug, Default)]
pub struct TestBattles {
    inner: RwLock<HashMap<Uuid, Battle>>,
}

impl TestBattles {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BattleRepository for TestBattles {
    async fn find_by_id(&self, battle_id: Uuid) -> Result<Option<Battle>, DomainError> {
        Ok(self.inner.read().await.get(&battle_id).cloned())
    }

    async fn find_by_spot_id(&self, spot_id: Uuid) -> Result<Option<Battle>, DomainError> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .find(|battle| battle.spot_id == spot_id && battle.state() != BattleState::Completed)
            .cloned())
    }

    async fn save(&self, battle: &Battle) -> Result<(), DomainError> {
        self.inner.write().await.insert(battle.id, battle.clone());
        Ok(())
    }

    async fn delete(&self, battle_id: Uuid) -> Result<(), DomainError> {
        self.inner.write().await.remove(&battle_id);
        Ok(())
    }
}

/// Map-backed action catalog.
#[derive(Debug, Default)]
pub struct TestActions {
    inner: RwLock<HashMap<Uuid, ActionDefinition>>,
}

impl TestActions {
    pub fn with_actions(actions: Vec<ActionDefinition>) -> Self {
        Self {
            inner: RwLock::new(actions.into_iter().map(|a| (a.id, a)).collect()),
        }
    }
}

#[async_trait]
impl ActionRepository for TestActions {
    async fn find_by_id(&self, action_id: Uuid) -> Result<Option<ActionDefinition>, DomainError> {
        Ok(self.inner.read().await.get(&action_id).cloned())
    }

    async fn find_by_ids(&self, action_ids: &[Uuid]) -> Result<Vec<ActionDefinition>, DomainError> {
        let actions = self.inner.read().await;
        Ok(action_ids
            .iter()
            .filter_map(|id| actions.get(id).cloned())
            .collect())
    }
}

/// Map-backed player store.
#[derive(Debug, Default)]
pub struct TestPlayers {
    inner: RwLock<HashMap<Uuid, PlayerSnapshot>>,
}

impl TestPlayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, player: PlayerSnapshot) {
        self.inner.write().await.insert(player.player_id, player);
    }
}

#[async_trait]
impl PlayerRepository for TestPlayers {
    async fn find_by_id(&self, player_id: Uuid) -> Result<Option<PlayerSnapshot>, DomainError> {
        Ok(self.inner.read().await.get(&player_id).cloned())
    }
}

/// Map-backed monster template store.
#[derive(Debug, Default)]
pub struct TestMonsters {
    inner: RwLock<HashMap<Uuid, MonsterSnapshot>>,
}

impl TestMonsters {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, monster: MonsterSnapshot) {
        self.inner
            .write()
            .await
            .insert(monster.monster_id, monster);
    }
}

#[async_trait]
impl MonsterRepository for TestMonsters {
    async fn find_by_id(&self, monster_id: Uuid) -> Result<Option<MonsterSnapshot>, DomainError> {
        Ok(self.inner.read().await.get(&monster_id).cloned())
    }
}

/// Map-backed area configuration store.
#[derive(Debug, Default)]
pub struct TestAreas {
    inner: RwLock<HashMap<Uuid, SpotConfig>>,
}

impl TestAreas {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, spot: SpotConfig) {
        self.inner.write().await.insert(spot.spot_id, spot);
    }
}

#[async_trait]
impl AreaRepository for TestAreas {
    async fn find_spot(&self, spot_id: Uuid) -> Result<Option<SpotConfig>, DomainError> {
        Ok(self.inner.read().await.get(&spot_id).cloned())
    }
}

/// Publisher that records published events and ignores handlers.
#[derive(Default)]
pub struct CapturingPublisher {
    published: Mutex<Vec<OutboundEvent>>,
}

impl CapturingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event published so far, in order.
    pub fn published_events(&self) -> Vec<OutboundEvent> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl EventPublisher for CapturingPublisher {
    async fn publish_all(&self, events: Vec<OutboundEvent>) {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(events);
    }

    fn register_handler(&self, _event_type: &str, _handler: EventHandler) {}
}
