//! In-memory infrastructure for the Emberfall battle engine.
//!
//! Battles are transient server state, so the production store is an
//! in-process map per repository. Entity and catalog repositories are
//! seeded at startup.

mod catalog;
mod memory;
mod notifier;
mod publisher;

pub use catalog::seed_action_catalog;
pub use memory::{
    InMemoryActionRepository, InMemoryAreaRepository, InMemoryBattleRepository,
    InMemoryMonsterRepository, InMemoryPlayerRepository,
};
pub use notifier::TracingNotifier;
pub use publisher::InMemoryEventPublisher;
