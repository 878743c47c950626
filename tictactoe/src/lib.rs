//! m,n,k Tic-Tac-Toe engine with a heuristic/minimax opponent.
//! Boards are square (2x2 up to 9x9) and the win length is configured
//! independently of the board size. The [`Game`] state machine is the only
//! entry point a front end needs: it validates and applies moves, detects
//! wins and draws, and computes the computer's reply for the configured
//! [`Difficulty`].
use serde::{Deserialize, Serialize};

pub mod advisor;
pub mod board;
pub mod error;
pub mod game;
pub mod lines;
pub mod moves;
pub mod search;

pub use board::{Board, Probe, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
pub use error::{GameError, IllegalMoveReason};
pub use game::{Difficulty, Game, GameConfig, GameOutcome, GameStatus, Seat, Snapshot, Strategy};
pub use lines::{Direction, Line, WinDetector};
pub use search::{best_move, Minimax, SearchResult};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The mark that opens every game.
    pub const FIRST: Mark = Mark::X;

    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// Zero-based cell coordinate; row 0 is the top row.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}
