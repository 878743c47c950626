//! Winning lines for an N x N board with win length L.
//!
//! Lines are generated once per (N, L) pair rather than read from a fixed
//! table, so every supported board size shares the same detector. Scan
//! order is rows, then columns, then down-right diagonals, then down-left
//! diagonals, each top-to-bottom and left-to-right; the first winning line
//! in that order is the one reported for highlighting.
use crate::board::Board;
use crate::error::GameError;
use crate::{Mark, Position};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Down and to the right.
    Diagonal,
    /// Down and to the left.
    AntiDiagonal,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::Diagonal,
        Direction::AntiDiagonal,
    ];

    fn step(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (1, -1),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Line {
    pub start: Position,
    pub direction: Direction,
    pub length: usize,
}

impl Line {
    /// Cells from `start` outwards. A step past column zero wraps to a huge
    /// index, which every bounds check rejects.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        let (dr, dc) = self.direction.step();
        (0..self.length as isize).map(move |k| {
            Position::new(
                self.start.row.wrapping_add_signed(dr * k),
                self.start.col.wrapping_add_signed(dc * k),
            )
        })
    }

    pub fn positions(&self) -> Vec<Position> {
        self.cells().collect()
    }
}

/// Every candidate line of exactly `win_length` cells, in scan order.
pub fn generate_lines(size: usize, win_length: usize) -> Vec<Line> {
    if win_length == 0 || win_length > size {
        return Vec::new();
    }
    let span = size - win_length + 1;
    let line = |row, col, direction| Line {
        start: Position::new(row, col),
        direction,
        length: win_length,
    };
    let mut lines = Vec::with_capacity(2 * size * span + 2 * span * span);
    for row in 0..size {
        for col in 0..span {
            lines.push(line(row, col, Direction::Horizontal));
        }
    }
    for col in 0..size {
        for row in 0..span {
            lines.push(line(row, col, Direction::Vertical));
        }
    }
    for row in 0..span {
        for col in 0..span {
            lines.push(line(row, col, Direction::Diagonal));
        }
    }
    for row in 0..span {
        for col in win_length - 1..size {
            lines.push(line(row, col, Direction::AntiDiagonal));
        }
    }
    lines
}

#[derive(Clone, Debug)]
pub struct WinDetector {
    size: usize,
    win_length: usize,
    lines: Vec<Line>,
}

impl WinDetector {
    pub fn new(size: usize, win_length: usize) -> Result<Self, GameError> {
        if win_length < 2 || win_length > size {
            return Err(GameError::invalid_config(format!(
                "win length {win_length} must be between 2 and the board size {size}"
            )));
        }
        Ok(Self {
            size,
            win_length,
            lines: generate_lines(size, win_length),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn has_win(&self, board: &Board, mark: Mark) -> bool {
        self.winning_line(board, mark).is_some()
    }

    /// Lines were generated for one board size; any other board never wins.
    fn fits(&self, board: &Board) -> bool {
        board.size() == self.size
    }

    pub fn winning_line(&self, board: &Board, mark: Mark) -> Option<Line> {
        if !self.fits(board) {
            return None;
        }
        self.lines
            .iter()
            .find(|line| line.cells().all(|pos| board.at(pos) == Some(mark)))
            .copied()
    }

    /// First winning line of either mark, in scan order.
    pub fn winner(&self, board: &Board) -> Option<(Mark, Line)> {
        if !self.fits(board) {
            return None;
        }
        self.lines.iter().find_map(|line| {
            let mut cells = line.cells();
            let first = board.at(cells.next()?)?;
            cells
                .all(|pos| board.at(pos) == Some(first))
                .then_some((first, *line))
        })
    }

    /// Whether `mark` at `pos` sits on a run of at least `win_length`.
    /// Only the four lines through `pos` are inspected, so this is the cheap
    /// check to run right after placing a mark on a board with no prior win.
    pub fn wins_through(&self, board: &Board, pos: Position, mark: Mark) -> bool {
        if !self.fits(board) || board.get(pos) != Ok(Some(mark)) {
            return false;
        }
        Direction::ALL.iter().any(|&direction| {
            let (dr, dc) = direction.step();
            1 + self.run(board, pos, mark, dr, dc) + self.run(board, pos, mark, -dr, -dc)
                >= self.win_length
        })
    }

    fn run(&self, board: &Board, from: Position, mark: Mark, dr: isize, dc: isize) -> usize {
        let size = self.size as isize;
        let (mut row, mut col) = (from.row as isize + dr, from.col as isize + dc);
        let mut count = 0;
        while (0..size).contains(&row)
            && (0..size).contains(&col)
            && board.at(Position::new(row as usize, col as usize)) == Some(mark)
        {
            count += 1;
            row += dr;
            col += dc;
        }
        count
    }
}
