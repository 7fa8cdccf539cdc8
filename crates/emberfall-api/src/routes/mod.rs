//! Route modules.

pub mod battle;
pub mod health;
