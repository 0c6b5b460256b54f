//! Move actions and the ways they can be rejected.

use crate::types::Player;
use serde::{Deserialize, Serialize};

/// A move in tic-tac-toe: a player placing their mark on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// Board index (0-8) where the mark goes.
    pub cell: usize,
}

impl Move {
    /// Creates a new move.
    pub fn new(player: Player, cell: usize) -> Self {
        Self { player, cell }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.player, self.cell)
    }
}

/// Reason a move was not applied.
///
/// The turn engine swallows these (an invalid move is a no-op); the online
/// adapter returns them to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// Cell index outside `0..9`.
    #[display("Cell {} is out of range (must be 0-8)", _0)]
    OutOfRange(#[error(not(source))] usize),

    /// The square already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    SquareOccupied(#[error(not(source))] usize),

    /// It is the other player's turn.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(#[error(not(source))] Player),

    /// The game has already ended.
    #[display("Game is already over")]
    GameOver,
}
