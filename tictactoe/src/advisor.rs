//! One-ply heuristics: take a win, block a loss, otherwise prefer the
//! center, then corners, then edges.
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::Board;
use crate::lines::WinDetector;
use crate::moves::{center_cell, corner_cells, edge_cells, empty_cells};
use crate::{Mark, Position};

/// First empty cell (row-major) where `mark` completes a line. The board is
/// probed and left as it was found.
pub fn find_immediate_win(board: &mut Board, detector: &WinDetector, mark: Mark) -> Option<Position> {
    for pos in empty_cells(board) {
        let probe = match board.probe(pos, mark) {
            Ok(probe) => probe,
            Err(_) => continue,
        };
        if detector.wins_through(&probe, pos, mark) {
            return Some(pos);
        }
    }
    None
}

/// Cell the opponent would win on next move, if any.
pub fn find_immediate_block(
    board: &mut Board,
    detector: &WinDetector,
    opponent: Mark,
) -> Option<Position> {
    find_immediate_win(board, detector, opponent)
}

pub fn positional_fallback<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Position> {
    let center = center_cell(board);
    if board.is_empty_at(center) {
        return Some(center);
    }
    let free = |cells: &[Position]| -> Vec<Position> {
        cells
            .iter()
            .copied()
            .filter(|&pos| board.is_empty_at(pos))
            .collect()
    };
    for tier in [free(&corner_cells(board)[..]), free(&edge_cells(board)), empty_cells(board)] {
        if let Some(&pos) = tier.choose(&mut *rng) {
            return Some(pos);
        }
    }
    None
}
