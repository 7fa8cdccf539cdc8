//! Application layer for the combat context.
//!
//! Orchestrates battles over the domain model: the battle service
//! handles commands, the loop drives turns on a per-battle task, the
//! waiter bridges player input into the loop, and the monster strategy
//! chooses monster actions.

pub mod battle_loop;
pub mod battle_service;
pub mod monster;
pub mod waiter;
