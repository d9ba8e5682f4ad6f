//! Error types for the rail game

use thiserror::Error;

use super::types::{EdgeKey, PlayerId, TilePosition};

pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// An action that is not allowed right now, or whose preconditions fail.
    /// Nothing was mutated.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    #[error("{player} cannot pay {amount} credits (balance {balance})")]
    InsufficientCredits {
        player: PlayerId,
        amount: i32,
        balance: i32,
    },

    /// Malformed map or configuration; fatal for game setup
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("need at least {required} players, got {actual}")]
    InsufficientPlayers { required: usize, actual: usize },

    #[error("no edge between {0}")]
    UnknownEdge(EdgeKey),

    #[error("no tile at {0}")]
    UnknownTile(TilePosition),

    #[error("game was stopped")]
    Stopped,
}

impl GameError {
    /// Errors the orchestrator swallows before waiting for the next action
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GameError::IllegalAction(_)
                | GameError::InsufficientCredits { .. }
                | GameError::UnknownEdge(_)
                | GameError::UnknownTile(_)
        )
    }

    pub(crate) fn illegal(message: impl Into<String>) -> Self {
        GameError::IllegalAction(message.into())
    }
}
