//! Shared application state.

use std::sync::Arc;

use emberfall_battle::application::battle_loop::BattleLoopService;
use emberfall_battle::application::battle_service::BattleService;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Battle orchestration service.
    pub service: Arc<BattleService>,
    /// Per-battle loop lifecycle manager.
    pub loops: Arc<BattleLoopService>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(service: Arc<BattleService>, loops: Arc<BattleLoopService>) -> Self {
        Self { service, loops }
    }
}
