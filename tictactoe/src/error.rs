use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
    #[error("position ({row}, {col}) is outside the {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },
    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },
    #[error("illegal move: {0}")]
    IllegalMove(IllegalMoveReason),
    #[error("no empty cell left to search")]
    SearchExhausted,
}

impl GameError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        GameError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IllegalMoveReason {
    NotStarted,
    GameOver,
    NotYourTurn,
}

impl fmt::Display for IllegalMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IllegalMoveReason::NotStarted => "no game in progress",
            IllegalMoveReason::GameOver => "the game is already over",
            IllegalMoveReason::NotYourTurn => "it is not this side's turn",
        };
        f.write_str(text)
    }
}
