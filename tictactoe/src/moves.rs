//! Geometric move queries. None of these change the board; taking a
//! [`Board`] means the size they see has already been validated.
use crate::board::Board;
use crate::Position;

pub fn empty_cells(board: &Board) -> Vec<Position> {
    board
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_none())
        .map(|(idx, _)| board.position_of(idx))
        .collect()
}

/// The middle cell. Even boards have four central cells; the upper-left one
/// is used.
pub fn center_cell(board: &Board) -> Position {
    let mid = (board.size() - 1) / 2;
    Position::new(mid, mid)
}

/// Corners clockwise from the top-left.
pub fn corner_cells(board: &Board) -> [Position; 4] {
    let last = board.size() - 1;
    [
        Position::new(0, 0),
        Position::new(0, last),
        Position::new(last, last),
        Position::new(last, 0),
    ]
}

pub fn is_corner(board: &Board, pos: Position) -> bool {
    let last = board.size() - 1;
    (pos.row == 0 || pos.row == last) && (pos.col == 0 || pos.col == last)
}

/// Border cells that are not corners, row-major.
pub fn edge_cells(board: &Board) -> Vec<Position> {
    let size = board.size();
    let last = size - 1;
    (0..size)
        .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
        .filter(|&pos| {
            let on_border = pos.row == 0 || pos.row == last || pos.col == 0 || pos.col == last;
            on_border && !is_corner(board, pos)
        })
        .collect()
}

/// Empty cells ordered for alpha-beta: center, then corners, then the rest
/// by distance from the middle of the board.
pub fn search_order(board: &Board) -> Vec<Position> {
    let size = board.size();
    let center = center_cell(board);
    let corners = corner_cells(board);
    // Distances are doubled so even boards measure from the true midpoint.
    let mid = size as isize - 1;
    let rank = |pos: &Position| -> (u8, usize) {
        if *pos == center {
            (0, 0)
        } else if corners.contains(pos) {
            (1, corners.iter().position(|c| c == pos).unwrap_or(0))
        } else {
            let dr = (2 * pos.row as isize - mid).unsigned_abs();
            let dc = (2 * pos.col as isize - mid).unsigned_abs();
            (2, dr.max(dc))
        }
    };
    let mut cells = empty_cells(board);
    cells.sort_by_key(rank);
    cells
}
