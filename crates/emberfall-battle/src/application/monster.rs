//! Monster action selection.

use emberfall_core::rng::DeterministicRng;

use crate::domain::action::{ActionDefinition, TargetPolicy};
use crate::domain::combat_state::{CombatState, ParticipantKey};

/// An action a monster decided to take.
#[derive(Debug, Clone)]
pub struct ChosenAction {
    /// The action to execute.
    pub definition: ActionDefinition,
    /// Explicit targets; empty defers to the action's default policy.
    pub targets: Vec<ParticipantKey>,
}

/// Decides what a monster does on its turn.
///
/// Strategies are pure over their inputs; randomness comes through the
/// injected RNG so monster turns are reproducible in tests.
pub trait MonsterActionStrategy: Send + Sync {
    /// Picks an action and targets for `monster`, or `None` to skip
    /// the turn when nothing is affordable.
    fn choose_action(
        &self,
        monster: &CombatState,
        actions: &[ActionDefinition],
        living_opponents: &[&CombatState],
        rng: &mut dyn DeterministicRng,
    ) -> Option<ChosenAction>;
}

/// Baseline strategy: the first affordable action in catalog order,
/// aimed at a uniformly random living opponent when the action targets
/// a single enemy.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleMonsterStrategy;

impl SimpleMonsterStrategy {
    fn is_affordable(monster: &CombatState, action: &ActionDefinition) -> bool {
        monster.mp.value() >= action.mp_cost && monster.hp.value() > action.hp_cost
    }
}

impl MonsterActionStrategy for SimpleMonsterStrategy {
    fn choose_action(
        &self,
        monster: &CombatState,
        actions: &[ActionDefinition],
        living_opponents: &[&CombatState],
        rng: &mut dyn DeterministicRng,
    ) -> Option<ChosenAction> {
        let definition = actions
            .iter()
            .find(|action| Self::is_affordable(monster, action))?
            .clone();

        let targets = match definition.default_targets {
            TargetPolicy::FirstEnemy if !living_opponents.is_empty() => {
                #[allow(clippy::cast_possible_truncation)]
                let index =
                    rng.next_u32_range(0, living_opponents.len() as u32 - 1) as usize;
                vec![living_opponents[index].key()]
            }
            _ => Vec::new(),
        };

        Some(ChosenAction { definition, targets })
    }
}
