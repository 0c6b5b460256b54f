//! Scoreboard business logic layer.

use reto_tictactoe::{DifficultyLevel, GameMode, GameOutcome, Scoreboard};
use tracing::{debug, info, instrument};

use crate::db::{DbError, GameResult, NewGameResult, ResultsRepository};

/// Service layer for recording finished games and reading totals.
///
/// Wraps [`ResultsRepository`] so callers deal in outcomes and
/// scoreboards rather than rows.
#[derive(Debug, Clone)]
pub struct ResultsService {
    repository: ResultsRepository,
}

impl ResultsService {
    /// Creates a new service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: ResultsRepository) -> Self {
        info!("Creating ResultsService");
        Self { repository }
    }

    /// Opens (and migrates) the database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened.
    #[instrument]
    pub fn open(db_path: &str) -> Result<Self, DbError> {
        Ok(Self::new(ResultsRepository::new(db_path.to_string())?))
    }

    /// Records a game against the computer and returns the new totals.
    #[instrument(skip(self))]
    pub fn record_local_game(
        &self,
        outcome: GameOutcome,
        difficulty: DifficultyLevel,
        moves_count: usize,
    ) -> Result<Scoreboard, DbError> {
        debug!(%outcome, %difficulty, moves_count, "Recording local game");
        self.repository
            .record_game(NewGameResult::local(outcome, difficulty, moves(moves_count)))?;
        self.scoreboard()
    }

    /// Records an online game from this player's side and returns the new
    /// totals.
    #[instrument(skip(self))]
    pub fn record_online_game(
        &self,
        outcome: GameOutcome,
        game_id: &str,
        moves_count: usize,
    ) -> Result<Scoreboard, DbError> {
        debug!(%outcome, game_id, moves_count, "Recording online game");
        self.repository
            .record_game(NewGameResult::online(outcome, game_id, moves(moves_count)))?;
        self.scoreboard()
    }

    /// Totals over every recorded game.
    #[instrument(skip(self))]
    pub fn scoreboard(&self) -> Result<Scoreboard, DbError> {
        self.repository.scoreboard(None)
    }

    /// Totals for one game mode.
    #[instrument(skip(self))]
    pub fn scoreboard_for(&self, mode: GameMode) -> Result<Scoreboard, DbError> {
        self.repository.scoreboard(Some(mode))
    }

    /// The `limit` most recent games.
    #[instrument(skip(self))]
    pub fn recent_games(&self, limit: usize) -> Result<Vec<GameResult>, DbError> {
        self.repository
            .history(i64::try_from(limit).unwrap_or(i64::MAX))
    }

    /// Forgets every recorded game.
    #[instrument(skip(self))]
    pub fn reset_scores(&self) -> Result<usize, DbError> {
        self.repository.clear()
    }
}

fn moves(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
