//! Turn engine for a local game between a human and the computer.
//!
//! The engine owns the board and the turn phase. Everything that changes a
//! game goes through [`TurnEngine::handle`]; observers read
//! [`TurnEngine::snapshot`].
//!
//! ```text
//!   AwaitingHumanMove --HumanMove--> ComputerThinking --ComputerMove--> AwaitingHumanMove
//!          |                                |
//!          +---------- terminal ------------+------------> GameOver
//! ```
//!
//! The computer's thinking delay is not modeled here; the async driver in
//! the server crate sleeps before sending [`EngineEvent::ComputerMove`].

use crate::computer::choose_move;
use crate::invariants::{BoardInvariants, InvariantSet};
use crate::rules::evaluate;
use crate::scoreboard::GameOutcome;
use crate::types::{Board, DifficultyLevel, GameState, Player};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Phase of the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum TurnPhase {
    /// Waiting for the human to pick a square.
    AwaitingHumanMove,
    /// The computer moves next (after the driver's artificial delay).
    ComputerThinking,
    /// A terminal state was reached.
    GameOver,
}

/// Input to the turn engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Discard the board and start over with a random first player.
    NewGame,
    /// The human places a mark on a cell (0-8).
    HumanMove(usize),
    /// The computer plays its move.
    ComputerMove,
    /// Change the computer's strength; takes effect on its next move.
    SetDifficulty(DifficultyLevel),
}

/// What [`TurnEngine::handle`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Event not valid in the current phase, or the move was illegal.
    /// Nothing changed.
    Ignored,
    /// State changed, game still running (or a setting changed).
    Applied,
    /// The event ended the game. Reported once per game.
    Finished(GameOutcome),
}

/// Point-in-time view of the engine, handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// The board.
    pub board: Board,
    /// Player whose turn it is.
    pub current_player: Player,
    /// Turn phase.
    pub phase: TurnPhase,
    /// Game state derived from the board.
    pub game_state: GameState,
    /// Computer strength.
    pub difficulty: DifficultyLevel,
    /// The human's mark.
    pub human: Player,
}

/// State machine for one local game session.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    board: Board,
    current_player: Player,
    phase: TurnPhase,
    difficulty: DifficultyLevel,
    human: Player,
    rng: StdRng,
}

impl TurnEngine {
    /// Creates an engine and starts a game with a random first player.
    #[instrument]
    pub fn new(difficulty: DifficultyLevel) -> Self {
        Self::with_seed(difficulty, rand::random::<u64>())
    }

    /// Creates an engine with a deterministic random source.
    #[instrument]
    pub fn with_seed(difficulty: DifficultyLevel, seed: u64) -> Self {
        let mut engine = Self {
            board: Board::new(),
            current_player: Player::X,
            phase: TurnPhase::GameOver,
            difficulty,
            human: Player::X,
            rng: StdRng::seed_from_u64(seed),
        };
        engine.start_game();
        engine
    }

    /// Single entry point for all state changes.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn handle(&mut self, event: EngineEvent) -> Handled {
        match event {
            EngineEvent::NewGame => {
                self.start_game();
                Handled::Applied
            }
            EngineEvent::HumanMove(cell) => self.human_move(cell),
            EngineEvent::ComputerMove => self.computer_move(),
            EngineEvent::SetDifficulty(level) => {
                info!(from = %self.difficulty, to = %level, "Difficulty changed");
                self.difficulty = level;
                Handled::Applied
            }
        }
    }

    /// Starts a new game with a chosen first player.
    #[instrument(skip(self))]
    pub fn restart_with(&mut self, first: Player) {
        self.board = Board::new();
        self.current_player = first;
        self.phase = self.phase_for_turn();
        info!(first = %first, phase = %self.phase, "New game started");
    }

    /// Returns a copy of the observable state.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            board: self.board.clone(),
            current_player: self.current_player,
            phase: self.phase,
            game_state: self.game_state(),
            difficulty: self.difficulty,
            human: self.human,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the turn phase.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Returns the computer's strength.
    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    /// Returns the human's mark.
    pub fn human(&self) -> Player {
        self.human
    }

    /// Game state, recomputed from the board.
    pub fn game_state(&self) -> GameState {
        evaluate(&self.board)
    }

    fn start_game(&mut self) {
        let first = if self.rng.random_bool(0.5) { Player::X } else { Player::O };
        self.restart_with(first);
    }

    fn phase_for_turn(&self) -> TurnPhase {
        if self.current_player == self.human {
            TurnPhase::AwaitingHumanMove
        } else {
            TurnPhase::ComputerThinking
        }
    }

    fn human_move(&mut self, cell: usize) -> Handled {
        if self.phase != TurnPhase::AwaitingHumanMove {
            debug!(cell, "Human move outside human turn ignored");
            return Handled::Ignored;
        }
        self.place(cell, self.human)
    }

    fn computer_move(&mut self) -> Handled {
        if self.phase != TurnPhase::ComputerThinking {
            debug!("Computer move outside computer turn ignored");
            return Handled::Ignored;
        }

        let computer = self.human.opponent();
        match choose_move(&self.board, computer, self.difficulty, &mut self.rng) {
            Some(cell) => self.place(cell, computer),
            None => {
                warn!("Computer found no open square");
                Handled::Ignored
            }
        }
    }

    fn place(&mut self, cell: usize, player: Player) -> Handled {
        if let Err(e) = self.board.apply_move(cell, player) {
            debug!(cell, error = %e, "Invalid move ignored");
            return Handled::Ignored;
        }

        if let Err(violations) = BoardInvariants::check_all(&self.board) {
            warn!(?violations, "Board invariant violated");
        }

        let state = self.game_state();
        info!(cell, player = %player, state = %state, "Move applied");

        if let Some(outcome) = GameOutcome::from_state(state, self.human) {
            self.phase = TurnPhase::GameOver;
            info!(outcome = %outcome, "Game over");
            return Handled::Finished(outcome);
        }

        self.current_player = player.opponent();
        self.phase = self.phase_for_turn();
        Handled::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_human_first() -> TurnEngine {
        let mut engine = TurnEngine::with_seed(DifficultyLevel::Expert, 42);
        engine.restart_with(Player::X);
        engine
    }

    #[test]
    fn test_new_game_phase_matches_first_player() {
        for seed in 0..20 {
            let engine = TurnEngine::with_seed(DifficultyLevel::Easy, seed);
            let expected = if engine.current_player() == Player::X {
                TurnPhase::AwaitingHumanMove
            } else {
                TurnPhase::ComputerThinking
            };
            assert_eq!(engine.phase(), expected);
            assert!(engine.board().empty_cells().len() == 9);
        }
    }

    #[test]
    fn test_both_players_can_start() {
        let firsts: std::collections::HashSet<Player> = (0..40)
            .map(|seed| TurnEngine::with_seed(DifficultyLevel::Easy, seed).current_player())
            .collect();
        assert_eq!(firsts.len(), 2);
    }

    #[test]
    fn test_human_move_hands_turn_to_computer() {
        let mut engine = engine_with_human_first();
        assert_eq!(engine.handle(EngineEvent::HumanMove(4)), Handled::Applied);
        assert_eq!(engine.phase(), TurnPhase::ComputerThinking);
        assert_eq!(engine.current_player(), Player::O);
    }

    #[test]
    fn test_computer_move_hands_turn_back() {
        let mut engine = engine_with_human_first();
        engine.handle(EngineEvent::HumanMove(4));
        assert_eq!(engine.handle(EngineEvent::ComputerMove), Handled::Applied);
        assert_eq!(engine.phase(), TurnPhase::AwaitingHumanMove);
        assert_eq!(engine.board().count(Player::O), 1);
    }

    #[test]
    fn test_out_of_turn_events_ignored() {
        let mut engine = engine_with_human_first();
        assert_eq!(engine.handle(EngineEvent::ComputerMove), Handled::Ignored);
        engine.handle(EngineEvent::HumanMove(0));
        let before = engine.snapshot();
        assert_eq!(engine.handle(EngineEvent::HumanMove(1)), Handled::Ignored);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_invalid_cells_ignored() {
        let mut engine = engine_with_human_first();
        engine.handle(EngineEvent::HumanMove(0));
        engine.handle(EngineEvent::ComputerMove);
        let before = engine.snapshot();
        assert_eq!(engine.handle(EngineEvent::HumanMove(0)), Handled::Ignored);
        assert_eq!(engine.handle(EngineEvent::HumanMove(9)), Handled::Ignored);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_set_difficulty_keeps_phase() {
        let mut engine = engine_with_human_first();
        assert_eq!(engine.handle(EngineEvent::SetDifficulty(DifficultyLevel::Easy)), Handled::Applied);
        assert_eq!(engine.difficulty(), DifficultyLevel::Easy);
        assert_eq!(engine.phase(), TurnPhase::AwaitingHumanMove);
    }
}
