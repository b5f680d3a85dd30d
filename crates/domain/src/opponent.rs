//! Deterministic opponent strategy.
//!
//! Priority: win now, otherwise block the other side's immediate win,
//! otherwise take the most central playable column. Moves are simulated on a
//! copy of the board; the caller applies the chosen column through the same
//! move path a human move takes.

use crate::board::{check_win, Board, Side};
use crate::error::GameError;

/// Column preference when nothing tactical is on the board.
pub const CENTER_PREFERENCE: [usize; 7] = [3, 2, 4, 1, 5, 0, 6];

/// Pick the column `side` should play next.
pub fn choose_move(board: &Board, side: Side) -> Result<usize, GameError> {
    if board.playable_columns().next().is_none() {
        return Err(GameError::NoValidMoves);
    }

    if let Some(col) = first_winning_column(board, side) {
        return Ok(col);
    }

    if let Some(col) = first_winning_column(board, side.opponent()) {
        return Ok(col);
    }

    CENTER_PREFERENCE
        .iter()
        .copied()
        .find(|&col| board.is_playable(col))
        .ok_or(GameError::NoValidMoves)
}

/// Lowest-indexed column where dropping a `side` piece wins immediately.
fn first_winning_column(board: &Board, side: Side) -> Option<usize> {
    board
        .playable_columns()
        .find(|&col| wins_by_dropping(board, col, side))
}

fn wins_by_dropping(board: &Board, col: usize, side: Side) -> bool {
    let mut scratch = *board;
    match scratch.drop_piece(col, side) {
        Ok(row) => check_win(&scratch, row, col, side),
        Err(_) => false,
    }
}
