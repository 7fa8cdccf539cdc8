//! In-memory repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use emberfall_battle::domain::action::ActionDefinition;
use emberfall_battle::domain::battle::{Battle, BattleState};
use emberfall_battle::domain::repositories::{
    ActionRepository, AreaRepository, BattleRepository, MonsterRepository, MonsterSnapshot,
    PlayerRepository, PlayerSnapshot, SpotConfig,
};
use emberfall_core::error::DomainError;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Battle store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryBattleRepository {
    battles: RwLock<HashMap<Uuid, Battle>>,
}

impl InMemoryBattleRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BattleRepository for InMemoryBattleRepository {
    async fn find_by_id(&self, battle_id: Uuid) -> Result<Option<Battle>, DomainError> {
        Ok(self.battles.read().await.get(&battle_id).cloned())
    }

    async fn find_by_spot_id(&self, spot_id: Uuid) -> Result<Option<Battle>, DomainError> {
        Ok(self
            .battles
            .read()
            .await
            .values()
            .find(|battle| battle.spot_id == spot_id && battle.state() != BattleState::Completed)
            .cloned())
    }

    async fn save(&self, battle: &Battle) -> Result<(), DomainError> {
        self.battles.write().await.insert(battle.id, battle.clone());
        Ok(())
    }

    async fn delete(&self, battle_id: Uuid) -> Result<(), DomainError> {
        self.battles.write().await.remove(&battle_id);
        Ok(())
    }
}

/// Action catalog backed by a seeded map.
#[derive(Debug, Default)]
pub struct InMemoryActionRepository {
    actions: RwLock<HashMap<Uuid, ActionDefinition>>,
}

impl InMemoryActionRepository {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated with `actions`.
    #[must_use]
    pub fn with_actions(actions: Vec<ActionDefinition>) -> Self {
        Self {
            actions: RwLock::new(actions.into_iter().map(|a| (a.id, a)).collect()),
        }
    }

    /// Adds or replaces one action definition.
    pub async fn insert(&self, action: ActionDefinition) {
        self.actions.write().await.insert(action.id, action);
    }
}

#[async_trait]
impl ActionRepository for InMemoryActionRepository {
    async fn find_by_id(&self, action_id: Uuid) -> Result<Option<ActionDefinition>, DomainError> {
        Ok(self.actions.read().await.get(&action_id).cloned())
    }

    async fn find_by_ids(
        &self,
        action_ids: &[Uuid],
    ) -> Result<Vec<ActionDefinition>, DomainError> {
        let actions = self.actions.read().await;
        Ok(action_ids
            .iter()
            .filter_map(|id| actions.get(id).cloned())
            .collect())
    }
}

/// Player snapshot store backed by a seeded map.
#[derive(Debug, Default)]
pub struct InMemoryPlayerRepository {
    players: RwLock<HashMap<Uuid, PlayerSnapshot>>,
}

impl InMemoryPlayerRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one player snapshot.
    pub async fn insert(&self, player: PlayerSnapshot) {
        self.players.write().await.insert(player.player_id, player);
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn find_by_id(&self, player_id: Uuid) -> Result<Option<PlayerSnapshot>, DomainError> {
        Ok(self.players.read().await.get(&player_id).cloned())
    }
}

/// Monster template store backed by a seeded map.
#[derive(Debug, Default)]
pub struct InMemoryMonsterRepository {
    monsters: RwLock<HashMap<Uuid, MonsterSnapshot>>,
}

impl InMemoryMonsterRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one monster template.
    pub async fn insert(&self, monster: MonsterSnapshot) {
        self.monsters
            .write()
            .await
            .insert(monster.monster_id, monster);
    }
}

#[async_trait]
impl MonsterRepository for InMemoryMonsterRepository {
    async fn find_by_id(&self, monster_id: Uuid) -> Result<Option<MonsterSnapshot>, DomainError> {
        Ok(self.monsters.read().await.get(&monster_id).cloned())
    }
}

/// Area spawn configuration store backed by a seeded map.
#[derive(Debug, Default)]
pub struct InMemoryAreaRepository {
    spots: RwLock<HashMap<Uuid, SpotConfig>>,
}

impl InMemoryAreaRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one spot configuration.
    pub async fn insert(&self, spot: SpotConfig) {
        self.spots.write().await.insert(spot.spot_id, spot);
    }
}

#[async_trait]
impl AreaRepository for InMemoryAreaRepository {
    async fn find_spot(&self, spot_id: Uuid) -> Result<Option<SpotConfig>, DomainError> {
        Ok(self.spots.read().await.get(&spot_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_battle_round_trips_through_the_store() {
        let repo = InMemoryBattleRepository::new();
        let battle = Battle::new(Uuid::new_v4(), Uuid::new_v4(), 4, 30);
        let battle_id = battle.id;

        repo.save(&battle).await.unwrap();
        let loaded = repo.find_by_id(battle_id).await.unwrap().unwrap();
        assert_eq!(loaded.id, battle_id);

        repo.delete(battle_id).await.unwrap();
        assert!(repo.find_by_id(battle_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_spot_lookup_ignores_other_spots() {
        let repo = InMemoryBattleRepository::new();
        let spot_id = Uuid::new_v4();
        let battle = Battle::new(Uuid::new_v4(), spot_id, 4, 30);
        repo.save(&battle).await.unwrap();

        assert!(repo.find_by_spot_id(spot_id).await.unwrap().is_some());
        assert!(repo.find_by_spot_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown_actions() {
        let catalog = crate::seed_action_catalog();
        let known = catalog[0].id;
        let repo = InMemoryActionRepository::with_actions(catalog);

        let found = repo.find_by_ids(&[known, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, known);
    }

    #[tokio::test]
    async fn test_action_cost_comes_from_the_definition() {
        let catalog = crate::seed_action_catalog();
        let fireball = catalog.iter().find(|a| a.name == "Fireball").unwrap().id;
        let repo = InMemoryActionRepository::with_actions(catalog);

        assert_eq!(repo.get_action_cost(fireball).await.unwrap(), (8, 0));
        assert!(repo.get_action_cost(Uuid::new_v4()).await.is_err());
    }
}
