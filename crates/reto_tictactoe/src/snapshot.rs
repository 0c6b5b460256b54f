//! The game document replicated between two online players.
//!
//! Each write replaces the whole document (last write wins). The game
//! state is not part of the stored fields: it is recomputed from the board
//! whenever it is asked for, so a stale value can never be replicated.

use crate::action::MoveError;
use crate::rules::evaluate;
use crate::types::{Board, GameState, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Identifier of an online game.
pub type GameId = String;

/// Full state of one online game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    game_id: GameId,
    available: bool,
    board: Board,
    current_player: Player,
}

impl GameSnapshot {
    /// Creates an open game waiting for a second player.
    #[instrument]
    pub fn open(game_id: GameId, first: Player) -> Self {
        Self {
            game_id,
            available: true,
            board: Board::new(),
            current_player: first,
        }
    }

    /// Returns the game ID.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Whether the game is still waiting for a second player.
    pub fn available(&self) -> bool {
        self.available
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Game state, recomputed from the board.
    pub fn game_state(&self) -> GameState {
        evaluate(&self.board)
    }

    /// Whether a terminal state was reached.
    pub fn game_over(&self) -> bool {
        self.game_state().is_terminal()
    }

    /// Marks the game as taken by a second player.
    pub fn close(&mut self) {
        self.available = false;
    }

    /// Applies `player`'s mark on `cell` and passes the turn.
    ///
    /// # Errors
    ///
    /// Rejects moves after the game ended, out of turn, or on a taken or
    /// out-of-range cell. The snapshot is unchanged on error.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub fn apply_move(&mut self, player: Player, cell: usize) -> Result<(), MoveError> {
        if self.game_over() {
            debug!("Move after game over");
            return Err(MoveError::GameOver);
        }

        if player != self.current_player {
            debug!(expected = %self.current_player, "Move out of turn");
            return Err(MoveError::NotYourTurn(player));
        }

        self.board.apply_move(cell, player)?;
        self.current_player = player.opponent();
        Ok(())
    }
}
