//! Win/loss/tie counters from the human player's point of view.

use crate::types::{GameState, Player};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Result of a finished game for one player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum GameOutcome {
    /// The player won.
    Win,
    /// The opponent won.
    Loss,
    /// Board filled without a line.
    Tie,
}

impl GameOutcome {
    /// Outcome of `state` for `player`, `None` while the game is running.
    #[instrument]
    pub fn from_state(state: GameState, player: Player) -> Option<Self> {
        match state {
            GameState::InProgress => None,
            GameState::Tie => Some(Self::Tie),
            GameState::WinnerX | GameState::WinnerO => {
                if state.winner() == Some(player) {
                    Some(Self::Win)
                } else {
                    Some(Self::Loss)
                }
            }
        }
    }
}

/// Running totals of finished games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    wins: u32,
    losses: u32,
    ties: u32,
}

impl Scoreboard {
    /// Creates a scoreboard with the given totals.
    pub fn new(wins: u32, losses: u32, ties: u32) -> Self {
        Self { wins, losses, ties }
    }

    /// Games won.
    pub fn wins(&self) -> u32 {
        self.wins
    }

    /// Games lost.
    pub fn losses(&self) -> u32 {
        self.losses
    }

    /// Games tied.
    pub fn ties(&self) -> u32 {
        self.ties
    }

    /// Total games recorded.
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Adds one finished game.
    pub fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win => self.wins += 1,
            GameOutcome::Loss => self.losses += 1,
            GameOutcome::Tie => self.ties += 1,
        }
    }
}

impl std::fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Wins: {}  Losses: {}  Ties: {}", self.wins, self.losses, self.ties)
    }
}
