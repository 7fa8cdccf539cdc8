//! Routes for the combat context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use emberfall_battle::application::battle_service::BattleStatus;
use emberfall_battle::application::waiter::WaiterStatistics;
use emberfall_battle::domain::action::result::BattleActionResult;
use emberfall_battle::domain::combat_state::ParticipantKey;
use emberfall_battle::domain::commands::{ExecutePlayerAction, JoinBattle, LeaveBattle, StartBattle};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /api/v1/battles.
#[derive(Debug, Deserialize)]
pub struct StartBattleRequest {
    /// The area spot to fight at.
    pub spot_id: Uuid,
    /// The initiating player.
    pub player_id: Uuid,
}

/// Response body for POST /api/v1/battles.
#[derive(Debug, Serialize)]
pub struct StartBattleResponse {
    /// The created battle.
    pub battle_id: Uuid,
}

/// Request body for POST /api/v1/battles/{id}/actions.
#[derive(Debug, Deserialize)]
pub struct ExecuteActionRequest {
    /// The acting player.
    pub player_id: Uuid,
    /// The catalog action to execute.
    pub action_id: Uuid,
    /// Explicit targets; omit to use the action's default policy.
    #[serde(default)]
    pub targets: Vec<ParticipantKey>,
}

/// Request body for join and leave.
#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    /// The player joining or leaving.
    pub player_id: Uuid,
}

/// POST /api/v1/battles
#[instrument(skip(state, request), fields(spot_id = %request.spot_id))]
async fn start_battle(
    State(state): State<AppState>,
    Json(request): Json<StartBattleRequest>,
) -> Result<(StatusCode, Json<StartBattleResponse>), ApiError> {
    let battle_id = state
        .service
        .start_battle(&StartBattle {
            spot_id: request.spot_id,
            player_id: request.player_id,
        })
        .await?;
    state.loops.start_battle_loop(battle_id).await?;

    info!(battle_id = %battle_id, "battle started");
    Ok((StatusCode::CREATED, Json(StartBattleResponse { battle_id })))
}

/// POST /api/v1/battles/{id}/actions
#[instrument(skip(state, request), fields(battle_id = %battle_id, player_id = %request.player_id))]
async fn execute_action(
    State(state): State<AppState>,
    Path(battle_id): Path<Uuid>,
    Json(request): Json<ExecuteActionRequest>,
) -> Result<Json<BattleActionResult>, ApiError> {
    let result = state
        .service
        .execute_player_action(ExecutePlayerAction {
            battle_id,
            player_id: request.player_id,
            action_id: request.action_id,
            targets: request.targets,
        })
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/battles/{id}/join
#[instrument(skip(state, request), fields(battle_id = %battle_id, player_id = %request.player_id))]
async fn join_battle(
    State(state): State<AppState>,
    Path(battle_id): Path<Uuid>,
    Json(request): Json<PlayerRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .join_battle(&JoinBattle {
            battle_id,
            player_id: request.player_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/battles/{id}/leave
#[instrument(skip(state, request), fields(battle_id = %battle_id, player_id = %request.player_id))]
async fn leave_battle(
    State(state): State<AppState>,
    Path(battle_id): Path<Uuid>,
    Json(request): Json<PlayerRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .leave_battle(&LeaveBattle {
            battle_id,
            player_id: request.player_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/battles/{id}
#[instrument(skip(state), fields(battle_id = %battle_id))]
async fn battle_status(
    State(state): State<AppState>,
    Path(battle_id): Path<Uuid>,
) -> Result<Json<BattleStatus>, ApiError> {
    let status = state.service.battle_status(battle_id).await?;
    Ok(Json(status))
}

/// GET /api/v1/battles/waiter-statistics
#[instrument(skip(state))]
async fn waiter_statistics(State(state): State<AppState>) -> Json<WaiterStatistics> {
    Json(state.service.waiter_statistics().await)
}

/// Returns the router for the combat context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_battle))
        .route("/waiter-statistics", get(waiter_statistics))
        .route("/{battle_id}", get(battle_status))
        .route("/{battle_id}/actions", post(execute_action))
        .route("/{battle_id}/join", post(join_battle))
        .route("/{battle_id}/leave", post(leave_battle))
}
