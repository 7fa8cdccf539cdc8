//! Domain layer for the combat context.

pub mod action;
pub mod battle;
pub mod combat_state;
pub mod commands;
pub mod events;
pub mod repositories;
pub mod turn_order;
pub mod turn_processor;
