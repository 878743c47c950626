//! Game state machine: configuration, turn order, termination and the
//! computer's move selection.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::advisor::{find_immediate_block, find_immediate_win, positional_fallback};
use crate::board::Board;
use crate::error::{GameError, IllegalMoveReason};
use crate::lines::{Line, WinDetector};
use crate::moves::empty_cells;
use crate::search::Minimax;
use crate::{Mark, Position};

/// Which mark the human holds. X always opens.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    #[default]
    First,
    Second,
}

impl Seat {
    pub fn mark(self) -> Mark {
        match self {
            Seat::First => Mark::FIRST,
            Seat::Second => Mark::FIRST.opponent(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

/// How the computer picks moves. Chosen once per game from the difficulty.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Any empty cell, no lookahead.
    Random,
    /// Win, block, then center/corner/edge preference.
    Heuristic,
    /// Win, block, then minimax; `None` searches to the end of the game.
    Minimax { depth: Option<usize> },
}

impl Difficulty {
    pub fn strategy(self, board_size: usize) -> Strategy {
        let small = board_size <= 3;
        match self {
            Difficulty::Easy => Strategy::Random,
            Difficulty::Medium => Strategy::Heuristic,
            Difficulty::Hard if small => Strategy::Minimax { depth: None },
            Difficulty::Hard => Strategy::Minimax { depth: Some(2) },
            Difficulty::Expert if small => Strategy::Minimax { depth: None },
            Difficulty::Expert => Strategy::Minimax { depth: Some(4) },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    pub win_length: usize,
    pub human: Seat,
    pub difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 3,
            win_length: 3,
            human: Seat::First,
            difficulty: Difficulty::Medium,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        Board::new(self.board_size)?;
        WinDetector::new(self.board_size, self.win_length)?;
        Ok(())
    }

    pub fn human_mark(&self) -> Mark {
        self.human.mark()
    }

    pub fn ai_mark(&self) -> Mark {
        self.human.mark().opponent()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress { turn: Mark },
    Won { mark: Mark },
    Draw,
}

impl GameStatus {
    pub fn outcome(self) -> GameOutcome {
        match self {
            GameStatus::NotStarted | GameStatus::InProgress { .. } => GameOutcome::Ongoing,
            GameStatus::Won { mark } => GameOutcome::Win(mark),
            GameStatus::Draw => GameOutcome::Draw,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Won { .. } | GameStatus::Draw)
    }

    pub fn turn(self) -> Option<Mark> {
        match self {
            GameStatus::InProgress { turn } => Some(turn),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Ongoing,
    Win(Mark),
    Draw,
}

/// Everything a front end needs to redraw after a call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub status: GameStatus,
    pub outcome: GameOutcome,
    pub board: Vec<Vec<Option<Mark>>>,
    pub to_move: Option<Mark>,
    pub human: Option<Mark>,
    pub ai: Option<Mark>,
    pub moves_played: usize,
    pub last_move: Option<Position>,
    pub winning_line: Option<Vec<Position>>,
}

#[derive(Debug)]
struct ActiveGame {
    config: GameConfig,
    strategy: Strategy,
    board: Board,
    detector: WinDetector,
    last_move: Option<Position>,
    winning_line: Option<Line>,
}

/// One game at a time. `start` may be called again to begin a new game.
#[derive(Debug)]
pub struct Game<R = StdRng> {
    rng: R,
    status: GameStatus,
    active: Option<ActiveGame>,
}

impl Game<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            status: GameStatus::NotStarted,
            active: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> Option<&GameConfig> {
        self.active.as_ref().map(|game| &game.config)
    }

    pub fn board(&self) -> Option<&Board> {
        self.active.as_ref().map(|game| &game.board)
    }

    pub fn strategy(&self) -> Option<Strategy> {
        self.active.as_ref().map(|game| game.strategy)
    }

    pub fn start(&mut self, config: GameConfig) -> Result<Snapshot, GameError> {
        let board = Board::new(config.board_size)?;
        let detector = WinDetector::new(config.board_size, config.win_length)?;
        let strategy = config.difficulty.strategy(config.board_size);
        debug!(
            size = config.board_size,
            win_length = config.win_length,
            human = ?config.human_mark(),
            ?strategy,
            "starting game"
        );
        self.active = Some(ActiveGame {
            config,
            strategy,
            board,
            detector,
            last_move: None,
            winning_line: None,
        });
        self.status = GameStatus::InProgress { turn: Mark::FIRST };
        Ok(self.current_state())
    }

    fn turn(&self) -> Result<Mark, GameError> {
        match self.status {
            GameStatus::InProgress { turn } => Ok(turn),
            GameStatus::NotStarted => Err(GameError::IllegalMove(IllegalMoveReason::NotStarted)),
            GameStatus::Won { .. } | GameStatus::Draw => {
                Err(GameError::IllegalMove(IllegalMoveReason::GameOver))
            }
        }
    }

    /// Places the mark of whichever side is to move. Human moves and moves
    /// returned by [`Game::compute_ai_move`] both come through here.
    pub fn apply_move(&mut self, pos: Position) -> Result<Snapshot, GameError> {
        let turn = self.turn()?;
        let game = self
            .active
            .as_mut()
            .ok_or(GameError::IllegalMove(IllegalMoveReason::NotStarted))?;
        game.board.place(pos, turn)?;
        game.last_move = Some(pos);

        self.status = if game.detector.wins_through(&game.board, pos, turn) {
            game.winning_line = game.detector.winning_line(&game.board, turn);
            GameStatus::Won { mark: turn }
        } else if game.board.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress {
                turn: turn.opponent(),
            }
        };
        debug!(mark = ?turn, row = pos.row, col = pos.col, status = ?self.status, "move applied");
        Ok(self.current_state())
    }

    /// Like [`Game::apply_move`] but refuses to play for the computer.
    pub fn play_human(&mut self, pos: Position) -> Result<Snapshot, GameError> {
        let turn = self.turn()?;
        if self.config().map(GameConfig::human_mark) != Some(turn) {
            return Err(GameError::IllegalMove(IllegalMoveReason::NotYourTurn));
        }
        self.apply_move(pos)
    }

    /// Picks the computer's next move without playing it. The board is
    /// probed during the search and restored before returning.
    pub fn compute_ai_move(&mut self) -> Result<Position, GameError> {
        let turn = self.turn()?;
        let game = self
            .active
            .as_mut()
            .ok_or(GameError::IllegalMove(IllegalMoveReason::NotStarted))?;
        if turn != game.config.ai_mark() {
            return Err(GameError::IllegalMove(IllegalMoveReason::NotYourTurn));
        }
        match choose_move(game, &mut self.rng) {
            Ok(pos) => {
                debug!(row = pos.row, col = pos.col, strategy = ?game.strategy, "computer chose move");
                Ok(pos)
            }
            Err(GameError::SearchExhausted) => {
                error!(board = %game.board, "no move available on a board still in progress; abandoning game");
                self.active = None;
                self.status = GameStatus::NotStarted;
                Err(GameError::SearchExhausted)
            }
            Err(err) => Err(err),
        }
    }

    pub fn play_ai_turn(&mut self) -> Result<(Position, Snapshot), GameError> {
        let pos = self.compute_ai_move()?;
        let snapshot = self.apply_move(pos)?;
        Ok((pos, snapshot))
    }

    pub fn current_state(&self) -> Snapshot {
        let Some(game) = self.active.as_ref() else {
            return Snapshot {
                status: self.status,
                outcome: self.status.outcome(),
                board: Vec::new(),
                to_move: None,
                human: None,
                ai: None,
                moves_played: 0,
                last_move: None,
                winning_line: None,
            };
        };
        Snapshot {
            status: self.status,
            outcome: self.status.outcome(),
            board: game.board.rows(),
            to_move: self.status.turn(),
            human: Some(game.config.human_mark()),
            ai: Some(game.config.ai_mark()),
            moves_played: game.board.marks_placed(),
            last_move: game.last_move,
            winning_line: game.winning_line.as_ref().map(Line::positions),
        }
    }
}

fn choose_move<R: Rng + ?Sized>(game: &mut ActiveGame, rng: &mut R) -> Result<Position, GameError> {
    let ai = game.config.ai_mark();
    let human = game.config.human_mark();
    let board = &mut game.board;
    if board.is_full() {
        return Err(GameError::SearchExhausted);
    }
    if game.strategy == Strategy::Random {
        return empty_cells(board)
            .choose(rng)
            .copied()
            .ok_or(GameError::SearchExhausted);
    }
    if let Some(pos) = find_immediate_win(board, &game.detector, ai) {
        return Ok(pos);
    }
    if let Some(pos) = find_immediate_block(board, &game.detector, human) {
        return Ok(pos);
    }
    match game.strategy {
        Strategy::Minimax { depth } => {
            let result = Minimax::new(&game.detector, ai, human, depth).best_move(board)?;
            debug!(nodes = result.nodes, score = result.score, "minimax finished");
            Ok(result.position)
        }
        _ => positional_fallback(board, rng).ok_or(GameError::SearchExhausted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: usize, win_length: usize, human: Seat, difficulty: Difficulty) -> GameConfig {
        GameConfig {
            board_size: size,
            win_length,
            human,
            difficulty,
        }
    }

    #[test]
    fn moves_before_start_are_rejected() {
        let mut game = Game::seeded(1);
        assert_eq!(game.status(), GameStatus::NotStarted);
        assert_eq!(
            game.apply_move(Position::new(0, 0)),
            Err(GameError::IllegalMove(IllegalMoveReason::NotStarted))
        );
        assert_eq!(
            game.compute_ai_move(),
            Err(GameError::IllegalMove(IllegalMoveReason::NotStarted))
        );
        assert!(game.current_state().board.is_empty());
    }

    #[test]
    fn start_validates_config() {
        let mut game = Game::seeded(1);
        for bad in [
            config(3, 4, Seat::First, Difficulty::Easy),
            config(5, 1, Seat::First, Difficulty::Easy),
            config(1, 1, Seat::First, Difficulty::Easy),
            config(12, 3, Seat::First, Difficulty::Easy),
        ] {
            assert!(matches!(game.start(bad), Err(GameError::InvalidConfig { .. })));
            assert_eq!(game.status(), GameStatus::NotStarted);
        }
        let snapshot = game.start(GameConfig::default()).unwrap();
        assert_eq!(snapshot.status, GameStatus::InProgress { turn: Mark::X });
        assert_eq!(snapshot.board.len(), 3);
    }

    #[test]
    fn turns_alternate_and_wrong_side_is_refused() {
        let mut game = Game::seeded(3);
        game.start(config(3, 3, Seat::Second, Difficulty::Medium)).unwrap();
        assert_eq!(
            game.play_human(Position::new(0, 0)),
            Err(GameError::IllegalMove(IllegalMoveReason::NotYourTurn))
        );
        let (ai_pos, snapshot) = game.play_ai_turn().unwrap();
        assert_eq!(ai_pos, Position::new(1, 1));
        assert_eq!(snapshot.to_move, Some(Mark::O));
        assert_eq!(
            game.compute_ai_move(),
            Err(GameError::IllegalMove(IllegalMoveReason::NotYourTurn))
        );
        let snapshot = game.play_human(Position::new(0, 0)).unwrap();
        assert_eq!(snapshot.board[0][0], Some(Mark::O));
        assert_eq!(snapshot.moves_played, 2);
    }

    #[test]
    fn occupied_cell_leaves_state_unchanged() {
        let mut game = Game::seeded(3);
        game.start(GameConfig::default()).unwrap();
        game.apply_move(Position::new(1, 1)).unwrap();
        let before = game.current_state();
        assert_eq!(
            game.apply_move(Position::new(1, 1)),
            Err(GameError::CellOccupied { row: 1, col: 1 })
        );
        assert!(matches!(
            game.apply_move(Position::new(5, 0)),
            Err(GameError::OutOfBounds { .. })
        ));
        assert_eq!(game.current_state(), before);
    }

    #[test]
    fn win_reports_line_and_freezes_game() {
        let mut game = Game::seeded(3);
        game.start(GameConfig::default()).unwrap();
        for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            game.apply_move(Position::new(row, col)).unwrap();
        }
        let snapshot = game.apply_move(Position::new(0, 2)).unwrap();
        assert_eq!(snapshot.status, GameStatus::Won { mark: Mark::X });
        assert_eq!(snapshot.outcome, GameOutcome::Win(Mark::X));
        assert_eq!(
            snapshot.winning_line,
            Some(vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)])
        );
        assert_eq!(snapshot.to_move, None);

        for _ in 0..3 {
            assert_eq!(
                game.apply_move(Position::new(2, 2)),
                Err(GameError::IllegalMove(IllegalMoveReason::GameOver))
            );
            assert_eq!(
                game.apply_move(Position::new(0, 0)),
                Err(GameError::IllegalMove(IllegalMoveReason::GameOver))
            );
        }
        assert_eq!(game.current_state(), snapshot);
    }

    #[test]
    fn filled_board_without_line_is_a_draw() {
        let mut game = Game::seeded(3);
        game.start(GameConfig::default()).unwrap();
        let moves = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)];
        let mut snapshot = game.current_state();
        for (row, col) in moves {
            snapshot = game.apply_move(Position::new(row, col)).unwrap();
        }
        assert_eq!(snapshot.status, GameStatus::Draw);
        assert_eq!(snapshot.outcome, GameOutcome::Draw);
        assert_eq!(snapshot.winning_line, None);
        assert_eq!(
            game.apply_move(Position::new(0, 0)),
            Err(GameError::IllegalMove(IllegalMoveReason::GameOver))
        );
    }

    #[test]
    fn hard_answers_corner_opening_with_center() {
        let mut game = Game::seeded(9);
        game.start(config(3, 3, Seat::First, Difficulty::Hard)).unwrap();
        game.play_human(Position::new(0, 0)).unwrap();
        assert_eq!(game.compute_ai_move().unwrap(), Position::new(1, 1));
    }

    #[test]
    fn compute_does_not_play() {
        let mut game = Game::seeded(9);
        game.start(config(5, 4, Seat::First, Difficulty::Expert)).unwrap();
        game.play_human(Position::new(2, 2)).unwrap();
        let before = game.current_state();
        let pos = game.compute_ai_move().unwrap();
        assert_eq!(game.current_state(), before);
        assert!(game.board().unwrap().is_empty_at(pos));
    }

    #[test]
    fn easy_plays_random_legal_cells() {
        let mut game = Game::seeded(11);
        game.start(config(3, 3, Seat::Second, Difficulty::Easy)).unwrap();
        assert_eq!(game.strategy(), Some(Strategy::Random));
        while let GameStatus::InProgress { turn } = game.status() {
            if turn == Mark::X {
                game.play_ai_turn().unwrap();
            } else {
                let board = game.board().unwrap();
                let pos = empty_cells(board)[0];
                game.play_human(pos).unwrap();
            }
        }
        assert!(game.status().is_terminal());
    }

    #[test]
    fn easy_ignores_an_open_win() {
        // X (computer) to move with (0, 2) completing the top row.
        let script = [(0, 0), (1, 0), (0, 1), (1, 1)];
        let winning = Position::new(0, 2);
        let mut missed = 0;
        for seed in 0..64 {
            let mut game = Game::seeded(seed);
            game.start(config(3, 3, Seat::Second, Difficulty::Easy)).unwrap();
            for (row, col) in script {
                game.apply_move(Position::new(row, col)).unwrap();
            }
            let pos = game.compute_ai_move().unwrap();
            assert!(game.board().unwrap().is_empty_at(pos));
            if pos != winning {
                missed += 1;
            }
        }
        assert!(missed > 0, "easy tier should not look for wins");

        let mut game = Game::seeded(0);
        game.start(config(3, 3, Seat::Second, Difficulty::Medium)).unwrap();
        for (row, col) in script {
            game.apply_move(Position::new(row, col)).unwrap();
        }
        assert_eq!(game.compute_ai_move().unwrap(), winning);
    }

    #[test]
    fn medium_takes_win_over_block() {
        let mut game = Game::seeded(5);
        game.start(config(3, 3, Seat::First, Difficulty::Medium)).unwrap();
        for (row, col) in [(0, 0), (1, 0), (2, 2), (1, 1), (0, 1)] {
            game.apply_move(Position::new(row, col)).unwrap();
        }
        // O to move: row 1 wins for O, (0,2) would only block.
        let (pos, snapshot) = game.play_ai_turn().unwrap();
        assert_eq!(pos, Position::new(1, 2));
        assert_eq!(snapshot.status, GameStatus::Won { mark: Mark::O });
    }

    #[test]
    fn restart_discards_previous_game() {
        let mut game = Game::seeded(5);
        game.start(GameConfig::default()).unwrap();
        game.apply_move(Position::new(0, 0)).unwrap();
        let snapshot = game.start(config(5, 4, Seat::Second, Difficulty::Hard)).unwrap();
        assert_eq!(snapshot.moves_played, 0);
        assert_eq!(snapshot.board.len(), 5);
        assert_eq!(snapshot.human, Some(Mark::O));
        assert_eq!(game.strategy(), Some(Strategy::Minimax { depth: Some(2) }));
    }

    #[test]
    fn config_wire_format() {
        let config: GameConfig = serde_json::from_str(
            r#"{"board_size":5,"win_length":4,"human":"second","difficulty":"expert"}"#,
        )
        .unwrap();
        assert_eq!(config.ai_mark(), Mark::X);
        assert_eq!(config.difficulty, Difficulty::Expert);
        let defaults: GameConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, GameConfig::default());

        let status = serde_json::to_value(GameStatus::InProgress { turn: Mark::O }).unwrap();
        assert_eq!(status, serde_json::json!({"state": "in_progress", "turn": "o"}));
    }
}
