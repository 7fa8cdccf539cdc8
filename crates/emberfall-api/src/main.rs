//! Emberfall API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use emberfall_api::{routes, state};
use emberfall_battle::application::battle_loop::{BattleLoopService, LoopConfig};
use emberfall_battle::application::battle_service::BattleService;
use emberfall_battle::application::monster::SimpleMonsterStrategy;
use emberfall_core::clock::SystemClock;
use emberfall_core::rng::ThreadRngSource;
use emberfall_store::{
    InMemoryActionRepository, InMemoryAreaRepository, InMemoryBattleRepository,
    InMemoryEventPublisher, InMemoryMonsterRepository, InMemoryPlayerRepository, TracingNotifier,
    seed_action_catalog,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Emberfall API server");

    // Read configuration from environment.
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| format!("PORT must be a valid u16: {e}"))?;
    let action_timeout_secs: u64 = std::env::var("PLAYER_ACTION_TIMEOUT_SECS")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .map_err(|e| format!("PLAYER_ACTION_TIMEOUT_SECS must be a valid u64: {e}"))?;

    // Build the service graph over the in-memory store.
    let service = Arc::new(BattleService::new(
        Arc::new(InMemoryBattleRepository::new()),
        Arc::new(InMemoryActionRepository::with_actions(seed_action_catalog())),
        Arc::new(InMemoryPlayerRepository::new()),
        Arc::new(InMemoryMonsterRepository::new()),
        Arc::new(InMemoryAreaRepository::new()),
        Arc::new(InMemoryEventPublisher::new()),
        Arc::new(TracingNotifier),
        Arc::new(SimpleMonsterStrategy),
        Arc::new(SystemClock),
        Box::new(ThreadRngSource),
    ));
    let loops = Arc::new(BattleLoopService::new(
        Arc::clone(&service),
        LoopConfig {
            player_action_timeout: Duration::from_secs(action_timeout_secs),
            inter_turn_delay: Duration::from_millis(100),
        },
    ));
    let app_state = state::AppState::new(service, loops);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/battles", routes::battle::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
