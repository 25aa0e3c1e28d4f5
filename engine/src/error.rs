use thiserror::Error;

use crate::identifiers::SessionId;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move at ({row}, {col})")]
    IllegalMove { row: usize, col: usize },

    #[error("not your turn")]
    NotYourTurn,

    #[error("game is already over")]
    GameOver,

    #[error("no legal moves available")]
    NoLegalMove,

    #[error("invalid session setup: {message}")]
    InvalidSetup { message: String },

    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: SessionId },

    #[error("engine task failed: {message}")]
    EngineTask { message: String },
}
