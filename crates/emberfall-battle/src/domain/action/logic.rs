//! Strategy seams for action resolution.
//!
//! Hit determination and damage math sit behind traits so tests can
//! pin outcomes and alternative rule sets can be swapped in without
//! touching the action template.

use emberfall_core::rng::DeterministicRng;

use crate::domain::combat_state::{CombatState, Race};

/// Outcome of a single hit determination against one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The action connects.
    Hit {
        /// Whether the hit is critical.
        critical: bool,
    },
    /// The target evaded.
    Evaded,
    /// The actor missed outright.
    Missed,
}

impl HitOutcome {
    /// Whether the action connected.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// Resolves hit/evasion/miss and critical determination per target.
pub trait HitResolver: Send + Sync {
    /// Rolls one hit determination for `actor` against `target`.
    ///
    /// `hit_rate`, when present, is the action's own chance to connect
    /// before the target's evasion is considered.
    fn resolve_hit(
        &self,
        actor: &CombatState,
        target: &CombatState,
        hit_rate: Option<f64>,
        rng: &mut dyn DeterministicRng,
    ) -> HitOutcome;
}

/// Computes damage for a connected attack.
pub trait DamageCalculator: Send + Sync {
    /// Damage dealt by `actor` to `target` for one connected hit.
    fn calculate_damage(
        &self,
        actor: &CombatState,
        target: &CombatState,
        damage_multiplier: f64,
        compatibility_multiplier: f64,
        race_multiplier: f64,
        critical: bool,
    ) -> u32;
}

/// Default hit resolution: action hit-rate roll, then evasion roll,
/// then critical roll.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardHitResolver;

impl HitResolver for StandardHitResolver {
    fn resolve_hit(
        &self,
        actor: &CombatState,
        target: &CombatState,
        hit_rate: Option<f64>,
        rng: &mut dyn DeterministicRng,
    ) -> HitOutcome {
        if let Some(rate) = hit_rate {
            if rng.next_f64() >= rate {
                return HitOutcome::Missed;
            }
        }
        if rng.next_f64() < target.stats.evasion_rate {
            return HitOutcome::Evaded;
        }
        let critical = rng.next_f64() < actor.stats.critical_rate;
        HitOutcome::Hit { critical }
    }
}

/// Critical hits amplify damage by this factor.
pub const CRITICAL_MULTIPLIER: f64 = 1.5;

/// Default damage math: effective attack scaled by the action's
/// multiplier, minus effective defense, scaled by compatibility and
/// race multipliers, amplified on critical, floored at zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDamageCalculator;

impl DamageCalculator for StandardDamageCalculator {
    fn calculate_damage(
        &self,
        actor: &CombatState,
        target: &CombatState,
        damage_multiplier: f64,
        compatibility_multiplier: f64,
        race_multiplier: f64,
        critical: bool,
    ) -> u32 {
        let offense = actor.calculate_current_attack() * damage_multiplier;
        let mitigation = target.calculate_current_defense();
        let mut damage = (offense - mitigation).max(0.0);
        damage *= compatibility_multiplier * race_multiplier;
        if critical {
            damage *= CRITICAL_MULTIPLIER;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            damage.floor().max(0.0) as u32
        }
    }
}

/// Race-attack multiplier lookup, `1.0` when the action has no bonus
/// against the target's race.
#[must_use]
pub fn race_multiplier_for(multipliers: &[(Race, f64)], target_race: Race) -> f64 {
    multipliers
        .iter()
        .find(|(race, _)| *race == target_race)
        .map_or(1.0, |(_, multiplier)| *multiplier)
}

/// The strategy bundle consumed by action execution.
pub struct BattleLogic {
    /// Hit/evasion/critical determination.
    pub hit_resolver: Box<dyn HitResolver>,
    /// Damage math.
    pub damage_calculator: Box<dyn DamageCalculator>,
}

impl Default for BattleLogic {
    fn default() -> Self {
        Self {
            hit_resolver: Box::new(StandardHitResolver),
            damage_calculator: Box::new(StandardDamageCalculator),
        }
    }
}

impl std::fmt::Debug for BattleLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleLogic").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::combat_state::{
        BoundedValue, BuffType, CombatStats, Element, ParticipantType,
    };

    struct FixedRng(f64);

    impl DeterministicRng for FixedRng {
        fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
            min
        }

        fn next_f64(&mut self) -> f64 {
            self.0
        }
    }

    fn fighter(attack: u32, defense: u32, critical_rate: f64, evasion_rate: f64) -> CombatState {
        CombatState::new(
            Uuid::new_v4(),
            ParticipantType::Player,
            "fighter".to_owned(),
            crate::domain::combat_state::Race::Human,
            Element::Neutral,
            BoundedValue::new(100, 100),
            BoundedValue::new(50, 50),
            CombatStats {
                attack,
                defense,
                speed: 10,
                critical_rate,
                evasion_rate,
            },
            vec![],
        )
    }

    #[test]
    fn test_basic_damage_is_attack_minus_defense() {
        let actor = fighter(50, 0, 0.0, 0.0);
        let target = fighter(0, 30, 0.0, 0.0);

        let damage = StandardDamageCalculator.calculate_damage(&actor, &target, 1.0, 1.0, 1.0, false);

        assert_eq!(damage, 20);
    }

    #[test]
    fn test_damage_never_goes_negative() {
        let actor = fighter(10, 0, 0.0, 0.0);
        let target = fighter(0, 99, 0.0, 0.0);

        let damage = StandardDamageCalculator.calculate_damage(&actor, &target, 1.0, 1.0, 1.0, false);

        assert_eq!(damage, 0);
    }

    #[test]
    fn test_critical_amplifies_damage() {
        let actor = fighter(50, 0, 0.0, 0.0);
        let target = fighter(0, 30, 0.0, 0.0);

        let damage = StandardDamageCalculator.calculate_damage(&actor, &target, 1.0, 1.0, 1.0, true);

        assert_eq!(damage, 30);
    }

    #[test]
    fn test_compatibility_and_race_multipliers_scale_damage() {
        let actor = fighter(50, 0, 0.0, 0.0);
        let target = fighter(0, 30, 0.0, 0.0);

        let damage =
            StandardDamageCalculator.calculate_damage(&actor, &target, 1.0, 1.5, 2.0, false);

        assert_eq!(damage, 60);
    }

    #[test]
    fn test_attack_buff_raises_damage() {
        let actor = fighter(50, 0, 0.0, 0.0).with_buff(BuffType::Attack, 2.0, 3);
        let target = fighter(0, 30, 0.0, 0.0);

        let damage = StandardDamageCalculator.calculate_damage(&actor, &target, 1.0, 1.0, 1.0, false);

        assert_eq!(damage, 70);
    }

    #[test]
    fn test_full_evasion_always_evades() {
        let actor = fighter(50, 0, 0.0, 0.0);
        let target = fighter(0, 30, 0.0, 1.0);
        let mut rng = FixedRng(0.99);

        let outcome = StandardHitResolver.resolve_hit(&actor, &target, None, &mut rng);

        assert_eq!(outcome, HitOutcome::Evaded);
    }

    #[test]
    fn test_hit_rate_miss() {
        let actor = fighter(50, 0, 0.0, 0.0);
        let target = fighter(0, 30, 0.0, 0.0);
        let mut rng = FixedRng(0.9);

        let outcome = StandardHitResolver.resolve_hit(&actor, &target, Some(0.5), &mut rng);

        assert_eq!(outcome, HitOutcome::Missed);
    }

    #[test]
    fn test_critical_roll_uses_actor_rate() {
        let actor = fighter(50, 0, 0.5, 0.0);
        let target = fighter(0, 30, 0.0, 0.0);
        let mut rng = FixedRng(0.2);

        let outcome = StandardHitResolver.resolve_hit(&actor, &target, None, &mut rng);

        assert_eq!(outcome, HitOutcome::Hit { critical: true });
    }

    #[test]
    fn test_race_multiplier_lookup_defaults_to_one() {
        let multipliers = vec![(Race::Dragon, 2.0)];
        assert!((race_multiplier_for(&multipliers, Race::Dragon) - 2.0).abs() < f64::EPSILON);
        assert!((race_multiplier_for(&multipliers, Race::Slime) - 1.0).abs() < f64::EPSILON);
    }
}
