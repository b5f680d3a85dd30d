//! Board and rules for a 6x7 gravity grid.
//!
//! Row 0 is the top of the board and row `ROWS - 1` the bottom. Pieces only
//! ever land in the lowest empty cell of a column, so a column never has an
//! empty cell beneath an occupied one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GameError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Pieces in a line needed to win.
pub const CONNECT: usize = 4;

/// The four axes through a cell: horizontal, vertical and both diagonals.
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// One side of a session. Side one always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// Wire color of this side's pieces (1 or 2).
    pub fn color(self) -> u8 {
        match self {
            Side::One => 1,
            Side::Two => 2,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid side color {0}")]
pub struct InvalidSide(pub u8);

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        side.color()
    }
}

impl TryFrom<u8> for Side {
    type Error = InvalidSide;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Side::One),
            2 => Ok(Side::Two),
            other => Err(InvalidSide(other)),
        }
    }
}

/// A cell is either empty or holds one side's piece.
pub type Cell = Option<Side>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// A column is playable while its top cell is empty.
    pub fn is_playable(&self, col: usize) -> bool {
        col < COLS && self.cells[0][col].is_none()
    }

    /// Playable columns in ascending order.
    pub fn playable_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COLS).filter(move |&col| self.is_playable(col))
    }

    /// Row a piece dropped into `col` would land in.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col].is_none())
    }

    /// Drop a piece into `col` and return the row it landed in.
    pub fn drop_piece(&mut self, col: usize, side: Side) -> Result<usize, GameError> {
        if col >= COLS {
            return Err(GameError::InvalidColumn);
        }
        let row = self.landing_row(col).ok_or(GameError::ColumnFull)?;
        self.cells[row][col] = Some(side);
        Ok(row)
    }

    pub fn piece_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    /// Wire representation: 0 for empty, otherwise the side's color.
    pub fn to_colors(&self) -> [[u8; COLS]; ROWS] {
        let mut colors = [[0u8; COLS]; ROWS];
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                colors[row][col] = cell.map_or(0, Side::color);
            }
        }
        colors
    }
}

/// Whether the piece just placed at (`row`, `col`) completes a line.
///
/// Only the four axes through the placed cell are walked, since any new win
/// must include the most recent piece.
pub fn check_win(board: &Board, row: usize, col: usize, side: Side) -> bool {
    AXES.iter().any(|&(dr, dc)| {
        let run = 1 + run_length(board, row, col, dr, dc, side) + run_length(board, row, col, -dr, -dc, side);
        run >= CONNECT
    })
}

/// Contiguous `side` pieces walking away from (`row`, `col`), not counting it.
fn run_length(board: &Board, row: usize, col: usize, dr: isize, dc: isize, side: Side) -> usize {
    let mut count = 0;
    let (mut r, mut c) = (row as isize, col as isize);
    loop {
        r += dr;
        c += dc;
        if r < 0 || r >= ROWS as isize || c < 0 || c >= COLS as isize {
            break;
        }
        if board.get(r as usize, c as usize) != Some(side) {
            break;
        }
        count += 1;
    }
    count
}

/// A board is drawn once every column's top cell is occupied.
pub fn check_draw(board: &Board) -> bool {
    (0..COLS).all(|col| !board.is_playable(col))
}
