//! Errors returned by game store operations.

use derive_more::{Display, Error};
use reto_tictactoe::{GameId, MoveError};

/// Failure of a game store call.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    /// No game with this id.
    #[display("Game not found: {}", _0)]
    NotFound(#[error(not(source))] GameId),

    /// A game with this id was already created.
    #[display("Game already exists: {}", _0)]
    AlreadyExists(#[error(not(source))] GameId),

    /// The game was already taken by a second player.
    #[display("Game is no longer available: {}", _0)]
    Unavailable(#[error(not(source))] GameId),

    /// The move was rejected before anything was written.
    #[display("Invalid move: {}", _0)]
    InvalidMove(MoveError),

    /// Another task panicked while holding the store lock.
    #[display("Game store lock poisoned")]
    Poisoned,
}

impl From<MoveError> for StoreError {
    fn from(err: MoveError) -> Self {
        Self::InvalidMove(err)
    }
}
