//! Seed action catalog.
//!
//! Identifiers are fixed so entity seed data can reference actions by
//! UUID across restarts.

use emberfall_battle::domain::action::{
    ActionDefinition, ActionKind, ActionType, ApplyBuffParams, ApplyStatusParams, AttackParams,
    BuffRider, HealParams, StatusRider, TargetPolicy,
};
use emberfall_battle::domain::combat_state::{BuffType, Element, Race, StatusEffectType};
use uuid::{Uuid, uuid};

/// Basic physical strike.
pub const STRIKE_ID: Uuid = uuid!("0c2a6fd0-1db4-4a43-9a63-1a6c60f1b001");
/// Defend stance.
pub const DEFEND_ID: Uuid = uuid!("0c2a6fd0-1db4-4a43-9a63-1a6c60f1b002");
/// Single-target fire spell.
pub const FIREBALL_ID: Uuid = uuid!("0c2a6fd0-1db4-4a43-9a63-1a6c60f1b003");
/// Single-target heal spell.
pub const MEND_ID: Uuid = uuid!("0c2a6fd0-1db4-4a43-9a63-1a6c60f1b004");
/// All-enemy poison cloud.
pub const VENOM_MIST_ID: Uuid = uuid!("0c2a6fd0-1db4-4a43-9a63-1a6c60f1b005");
/// Party-wide attack buff.
pub const WAR_CRY_ID: Uuid = uuid!("0c2a6fd0-1db4-4a43-9a63-1a6c60f1b006");
/// Undead-bane holy strike.
pub const SMITE_ID: Uuid = uuid!("0c2a6fd0-1db4-4a43-9a63-1a6c60f1b007");
/// Monster bite.
pub const BITE_ID: Uuid = uuid!("0c2a6fd0-1db4-4a43-9a63-1a6c60f1b008");

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

/// Builds the built-in action catalog.
#[must_use]
pub fn seed_action_catalog() -> Vec<ActionDefinition> {
    vec![
        plain_attack(STRIKE_ID, "Strike", 1.0),
        ActionDefinition {
            id: DEFEND_ID,
            name: "Defend".to_owned(),
            action_type: ActionType::Physical,
            mp_cost: 0,
            hp_cost: 0,
            default_targets: TargetPolicy::SelfOnly,
            kind: ActionKind::Defend,
        },
        ActionDefinition {
            id: FIREBALL_ID,
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
                status_riders: vec![StatusRider {
                    effect: StatusEffectType::Burn,
                    duration: 3,
                    chance: 0.25,
                }],
                buff_riders: vec![],
            }),
        },
        ActionDefinition {
            id: MEND_ID,
            name: "Mend".to_owned(),
            action_type: ActionType::Magic,
            mp_cost: 6,
            hp_cost: 0,
            default_targets: TargetPolicy::SelfOnly,
            kind: ActionKind::Heal(HealParams {
                heal_hp_amount: 30,
                heal_mp_amount: 0,
                cures_status: vec![StatusEffectType::Poison, StatusEffectType::Burn],
                removes_buffs: vec![],
            }),
        },
        ActionDefinition {
            id: VENOM_MIST_ID,
            name: "Venom Mist".to_owned(),
            action_type: ActionType::Magic,
            mp_cost: 10,
            hp_cost: 0,
            default_targets: TargetPolicy::AllEnemies,
            kind: ActionKind::ApplyStatus(ApplyStatusParams {
                hit_rate: Some(0.8),
                effects: vec![StatusRider {
                    effect: StatusEffectType::Poison,
                    duration: 4,
                    chance: 1.0,
                }],
            }),
        },
        ActionDefinition {
            id: WAR_CRY_ID,
            name: "War Cry".to_owned(),
            action_type: ActionType::Physical,
            mp_cost: 4,
            hp_cost: 0,
            default_targets: TargetPolicy::AllAllies,
            kind: ActionKind::ApplyBuff(ApplyBuffParams {
                hit_rate: None,
                buffs: vec![BuffRider {
                    buff: BuffType::Attack,
                    multiplier: 1.3,
                    duration: 3,
                    chance: 1.0,
                }],
            }),
        },
        ActionDefinition {
            id: SMITE_ID,
            name: "Smite".to_owned(),
            action_type: ActionType::Magic,
            mp_cost: 12,
            hp_cost: 0,
            default_targets: TargetPolicy::FirstEnemy,
            kind: ActionKind::Attack(AttackParams {
                damage_multiplier: 1.4,
                hit_rate: None,
                element: Some(Element::Light),
                race_multipliers: vec![(Race::Undead, 2.0)],
                status_riders: vec![],
                buff_riders: vec![],
            }),
        },
        plain_attack(BITE_ID, "Bite", 1.1),
    ]
}
