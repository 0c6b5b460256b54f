//! Database models for finished games.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use reto_tictactoe::{DifficultyLevel, GameMode, GameOutcome};
use tracing::instrument;

use crate::db::{DbError, schema};

/// A finished game as stored.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::game_results)]
pub struct GameResult {
    id: i32,
    mode: String,
    difficulty: Option<String>,
    outcome: String,
    moves_count: i32,
    game_id: Option<String>,
    played_at: NaiveDateTime,
}

impl GameResult {
    /// Parses the stored outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown value.
    #[instrument(skip(self), fields(outcome = %self.outcome))]
    pub fn parse_outcome(&self) -> Result<GameOutcome, DbError> {
        self.outcome
            .parse()
            .map_err(|_| DbError::invalid_data(format!("Invalid outcome: '{}'", self.outcome)))
    }

    /// Parses the stored game mode.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown value.
    pub fn parse_mode(&self) -> Result<GameMode, DbError> {
        self.mode
            .parse()
            .map_err(|_| DbError::invalid_data(format!("Invalid mode: '{}'", self.mode)))
    }

    /// Parses the stored difficulty, `None` for online games.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown value.
    pub fn parse_difficulty(&self) -> Result<Option<DifficultyLevel>, DbError> {
        self.difficulty
            .as_deref()
            .map(|d| {
                d.parse()
                    .map_err(|_| DbError::invalid_data(format!("Invalid difficulty: '{}'", d)))
            })
            .transpose()
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let opponent = match (&self.difficulty, &self.game_id) {
            (Some(level), _) => format!("computer ({})", level),
            (None, Some(id)) => format!("online {}", id),
            (None, None) => "unknown".to_string(),
        };
        write!(
            f,
            "{}  {:<4}  vs {}  in {} moves",
            self.played_at.format("%Y-%m-%d %H:%M"),
            self.outcome,
            opponent,
            self.moves_count
        )
    }
}

/// Insertable row for recording a finished game.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::game_results)]
pub struct NewGameResult {
    mode: String,
    difficulty: Option<String>,
    outcome: String,
    moves_count: i32,
    game_id: Option<String>,
}

impl NewGameResult {
    /// A game against the computer.
    pub fn local(outcome: GameOutcome, difficulty: DifficultyLevel, moves_count: i32) -> Self {
        Self::new(
            GameMode::SinglePlayer.to_string(),
            Some(difficulty.to_string()),
            outcome.to_string(),
            moves_count,
            None,
        )
    }

    /// An online game, from this player's side.
    pub fn online(outcome: GameOutcome, game_id: impl Into<String>, moves_count: i32) -> Self {
        Self::new(
            GameMode::Multiplayer.to_string(),
            None,
            outcome.to_string(),
            moves_count,
            Some(game_id.into()),
        )
    }
}
