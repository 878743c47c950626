//! Depth-limited minimax with alpha-beta pruning.
//!
//! The search mutates a single board through [`Board::probe`] guards and
//! never clones it. Terminal scores are `BASE - depth` for a win and
//! `depth - BASE` for a loss, so quicker wins and slower losses rank
//! higher. When the depth limit stops the search early, positions are
//! scored by counting open lines.
use crate::board::Board;
use crate::error::GameError;
use crate::lines::WinDetector;
use crate::moves::search_order;
use crate::{Mark, Position};

/// Larger than any positional evaluation on a supported board
/// (at most 4 * 81 lines worth 10^8 each).
pub const BASE: i64 = 1_000_000_000_000_000;
const INFINITY: i64 = i64::MAX / 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub position: Position,
    pub score: i64,
    /// Positions visited, root moves included.
    pub nodes: u64,
}

pub struct Minimax<'a> {
    detector: &'a WinDetector,
    mark: Mark,
    opponent: Mark,
    max_depth: Option<usize>,
    nodes: u64,
}

impl<'a> Minimax<'a> {
    /// `max_depth` counts plies from the current position; `None` searches
    /// to the end of the game.
    pub fn new(detector: &'a WinDetector, mark: Mark, opponent: Mark, max_depth: Option<usize>) -> Self {
        Self {
            detector,
            mark,
            opponent,
            max_depth: max_depth.map(|depth| depth.max(1)),
            nodes: 0,
        }
    }

    pub fn best_move(&mut self, board: &mut Board) -> Result<SearchResult, GameError> {
        if board.size() != self.detector.size() {
            return Err(GameError::invalid_config(format!(
                "detector built for {0}x{0} cannot search a {1}x{1} board",
                self.detector.size(),
                board.size()
            )));
        }
        let candidates = search_order(board);
        if candidates.is_empty() {
            return Err(GameError::SearchExhausted);
        }
        self.nodes = 0;
        let mut alpha = -INFINITY;
        let mut best: Option<(Position, i64)> = None;
        for pos in candidates {
            let score = {
                let mut probe = board.probe(pos, self.mark)?;
                self.score_move(&mut probe, pos, self.mark, 1, alpha, INFINITY)
            };
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((pos, score));
            }
            alpha = alpha.max(score);
        }
        let (position, score) = best.ok_or(GameError::SearchExhausted)?;
        Ok(SearchResult {
            position,
            score,
            nodes: self.nodes,
        })
    }

    /// Scores the position right after `mover` played `pos` at ply `depth`.
    fn score_move(
        &mut self,
        board: &mut Board,
        pos: Position,
        mover: Mark,
        depth: usize,
        alpha: i64,
        beta: i64,
    ) -> i64 {
        self.nodes += 1;
        if self.detector.wins_through(board, pos, mover) {
            return if mover == self.mark {
                BASE - depth as i64
            } else {
                depth as i64 - BASE
            };
        }
        if board.is_full() {
            return 0;
        }
        if self.max_depth.is_some_and(|max| depth >= max) {
            return self.evaluate(board);
        }
        self.minimax(board, depth, mover.opponent(), alpha, beta)
    }

    fn minimax(&mut self, board: &mut Board, depth: usize, to_move: Mark, mut alpha: i64, mut beta: i64) -> i64 {
        let maximizing = to_move == self.mark;
        let mut best = if maximizing { -INFINITY } else { INFINITY };
        for pos in search_order(board) {
            let Ok(mut probe) = board.probe(pos, to_move) else {
                continue;
            };
            let score = self.score_move(&mut probe, pos, to_move, depth + 1, alpha, beta);
            drop(probe);
            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if beta <= alpha {
                break;
            }
        }
        best
    }

    /// Sum over lines held by one side only: `10^count` for ours,
    /// `-10^count` for theirs.
    pub fn evaluate(&self, board: &Board) -> i64 {
        self.detector
            .lines()
            .iter()
            .map(|line| {
                let (mut own, mut theirs) = (0u32, 0u32);
                let cells = board.extract_line(line).unwrap_or_default();
                for cell in cells.into_iter().flatten() {
                    if cell == self.mark {
                        own += 1;
                    } else if cell == self.opponent {
                        theirs += 1;
                    }
                }
                match (own, theirs) {
                    (0, 0) => 0,
                    (n, 0) => 10i64.pow(n),
                    (0, n) => -10i64.pow(n),
                    _ => 0,
                }
            })
            .sum()
    }
}

pub fn best_move(
    board: &mut Board,
    detector: &WinDetector,
    mark: Mark,
    opponent: Mark,
    max_depth: Option<usize>,
) -> Result<Position, GameError> {
    Minimax::new(detector, mark, opponent, max_depth)
        .best_move(board)
        .map(|result| result.position)
}
