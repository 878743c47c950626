use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::GameError;
use crate::lines::Line;
use crate::{Mark, Position};

pub const MIN_BOARD_SIZE: usize = 2;
/// Larger boards make even depth-limited search sluggish.
pub const MAX_BOARD_SIZE: usize = 9;

/// Square grid stored row-major. Cells only change through [`Board::place`]
/// and [`Board::clear`] (or a [`Probe`], which pairs the two).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Mark>>,
    placed: usize,
}

impl Board {
    pub fn new(size: usize) -> Result<Self, GameError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(GameError::invalid_config(format!(
                "board size {size} must be between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}"
            )));
        }
        Ok(Self {
            size,
            cells: vec![None; size * size],
            placed: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cells(&self) -> &[Option<Mark>] {
        &self.cells
    }

    pub fn marks_placed(&self) -> usize {
        self.placed
    }

    pub fn is_full(&self) -> bool {
        self.placed == self.cells.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    fn index(&self, pos: Position) -> Result<usize, GameError> {
        if !self.contains(pos) {
            return Err(GameError::OutOfBounds {
                row: pos.row,
                col: pos.col,
                size: self.size,
            });
        }
        Ok(pos.row * self.size + pos.col)
    }

    pub fn position_of(&self, index: usize) -> Position {
        Position::new(index / self.size, index % self.size)
    }

    pub fn get(&self, pos: Position) -> Result<Option<Mark>, GameError> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Unchecked read for positions already known to be on the board.
    pub(crate) fn at(&self, pos: Position) -> Option<Mark> {
        self.cells[pos.row * self.size + pos.col]
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.contains(pos) && self.at(pos).is_none()
    }

    pub fn place(&mut self, pos: Position, mark: Mark) -> Result<(), GameError> {
        let idx = self.index(pos)?;
        if self.cells[idx].is_some() {
            return Err(GameError::CellOccupied {
                row: pos.row,
                col: pos.col,
            });
        }
        self.cells[idx] = Some(mark);
        self.placed += 1;
        Ok(())
    }

    /// Empties a cell. Only search backtracking should need this.
    pub fn clear(&mut self, pos: Position) -> Result<Option<Mark>, GameError> {
        let idx = self.index(pos)?;
        let previous = self.cells[idx].take();
        if previous.is_some() {
            self.placed -= 1;
        }
        Ok(previous)
    }

    /// Places `mark` for the lifetime of the returned guard; the cell is
    /// emptied again when the guard drops.
    pub fn probe(&mut self, pos: Position, mark: Mark) -> Result<Probe<'_>, GameError> {
        self.place(pos, mark)?;
        Ok(Probe { board: self, pos })
    }

    /// Marks along `line`, or `OutOfBounds` for the first cell that does not
    /// fit this board.
    pub fn extract_line(&self, line: &Line) -> Result<Vec<Option<Mark>>, GameError> {
        line.cells().map(|pos| self.get(pos)).collect()
    }

    /// Owned row-by-row copy for snapshots.
    pub fn rows(&self) -> Vec<Vec<Option<Mark>>> {
        self.cells.chunks(self.size).map(<[_]>::to_vec).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| cell.map_or('.', Mark::symbol).to_string())
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// A hypothetical move. Derefs to the board it was placed on and undoes
/// the placement on drop, so early returns cannot leak a mark.
#[derive(Debug)]
pub struct Probe<'a> {
    board: &'a mut Board,
    pos: Position,
}

impl Probe<'_> {
    pub fn position(&self) -> Position {
        self.pos
    }
}

impl Deref for Probe<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Probe<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        let idx = self.pos.row * self.board.size + self.pos.col;
        if self.board.cells[idx].take().is_some() {
            self.board.placed -= 1;
        }
    }
}
