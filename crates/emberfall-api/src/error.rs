//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use emberfall_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::BattleNotFound(_) => (StatusCode::NOT_FOUND, "battle_not_found"),
            DomainError::ActorNotFound(_) => (StatusCode::NOT_FOUND, "actor_not_found"),
            DomainError::AreaNotFound(_) => (StatusCode::NOT_FOUND, "area_not_found"),
            DomainError::BattleAlreadyExists(_) => (StatusCode::CONFLICT, "battle_already_exists"),
            DomainError::BattleLoopAlreadyRunning(_) => {
                (StatusCode::CONFLICT, "battle_loop_already_running")
            }
            DomainError::BattleNotInProgress { .. } => {
                (StatusCode::CONFLICT, "battle_not_in_progress")
            }
            DomainError::BattleFull { .. } => (StatusCode::CONFLICT, "battle_full"),
            DomainError::InvalidTurn { .. } => (StatusCode::CONFLICT, "invalid_turn"),
            DomainError::InsufficientMp { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_mp")
            }
            DomainError::InsufficientHp { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_hp")
            }
            DomainError::Silenced(_) => (StatusCode::UNPROCESSABLE_ENTITY, "silenced"),
            DomainError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
