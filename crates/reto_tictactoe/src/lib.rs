//! Reto tic-tac-toe - pure game logic.
//!
//! # Architecture
//!
//! - **Board**: 9 squares in row-major order, marks placed by [`Board::apply_move`]
//! - **Rules**: [`evaluate`] derives a [`GameState`] from a board, never cached
//! - **Computer**: [`choose_move`] picks the computer's square per [`DifficultyLevel`]
//! - **Engine**: [`TurnEngine`] drives a local human-vs-computer game through
//!   a single [`TurnEngine::handle`] entry point
//! - **Snapshot**: [`GameSnapshot`] is the document replicated between two
//!   online players (last write wins)
//!
//! # Example
//!
//! ```
//! use reto_tictactoe::{Board, GameState, Player, evaluate};
//!
//! let mut board = Board::new();
//! for cell in [0, 1, 2] {
//!     board.apply_move(cell, Player::X).unwrap();
//! }
//! assert_eq!(evaluate(&board), GameState::WinnerX);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod computer;
mod engine;
mod invariants;
mod position;
mod rules;
mod scoreboard;
mod snapshot;
mod types;

pub use action::{Move, MoveError};
pub use computer::{blocking_move, choose_move, winning_move};
pub use engine::{EngineEvent, EngineSnapshot, Handled, TurnEngine, TurnPhase};
pub use invariants::{BalancedMarks, BoardInvariants, Invariant, InvariantSet, InvariantViolation, SingleWinner};
pub use position::Position;
pub use rules::{LINES, check_winner, evaluate, is_full};
pub use scoreboard::{GameOutcome, Scoreboard};
pub use snapshot::{GameId, GameSnapshot};
pub use types::{BOARD_SIZE, Board, DifficultyLevel, GameMode, GameState, Player, Square};
