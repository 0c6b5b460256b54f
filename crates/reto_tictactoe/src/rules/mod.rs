//! Game rules for tic-tac-toe.
//!
//! Pure functions evaluating a board. The game state is always recomputed
//! from the squares rather than stored alongside them.

mod draw;
mod win;

pub use draw::is_full;
pub use win::{LINES, check_winner};

use crate::types::{Board, GameState};
use tracing::instrument;

/// Derives the state of the game from the board.
///
/// Winning lines are checked in [`LINES`] order (rows top to bottom, columns
/// left to right, then the two diagonals); the first complete line decides.
/// A full board without a line is a tie.
#[instrument(skip(board))]
pub fn evaluate(board: &Board) -> GameState {
    if let Some(winner) = check_winner(board) {
        return GameState::won_by(winner);
    }

    if is_full(board) {
        return GameState::Tie;
    }

    GameState::InProgress
}
