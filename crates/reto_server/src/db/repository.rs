//! Database repository for finished games.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use reto_tictactoe::{GameMode, Scoreboard};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, GameResult, NewGameResult, schema};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for game results.
#[derive(Debug, Clone)]
pub struct ResultsRepository {
    db_path: String,
}

impl ResultsRepository {
    /// Opens the database at `db_path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating ResultsRepository");
        let repository = Self { db_path };
        repository.run_migrations()?;
        Ok(repository)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::connection(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    #[instrument(skip(self))]
    fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::migration(format!("Migration failed: {}", e)))?;
        debug!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Records a finished game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, result), fields(mode = %result.mode(), outcome = %result.outcome()))]
    pub fn record_game(&self, result: NewGameResult) -> Result<GameResult, DbError> {
        debug!("Recording game result");
        let mut conn = self.connection()?;

        let stored = diesel::insert_into(schema::game_results::table)
            .values(&result)
            .returning(GameResult::as_returning())
            .get_result(&mut conn)?;

        info!(result_id = stored.id(), outcome = %stored.outcome(), "Game result recorded");
        Ok(stored)
    }

    /// Most recent results first, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn history(&self, limit: i64) -> Result<Vec<GameResult>, DbError> {
        let mut conn = self.connection()?;

        let results = schema::game_results::table
            .order((
                schema::game_results::played_at.desc(),
                schema::game_results::id.desc(),
            ))
            .limit(limit)
            .load::<GameResult>(&mut conn)?;

        debug!(count = results.len(), "History loaded");
        Ok(results)
    }

    /// Wins, losses and ties over all results, or over one mode.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn scoreboard(&self, mode: Option<GameMode>) -> Result<Scoreboard, DbError> {
        let mut conn = self.connection()?;

        let mut query = schema::game_results::table
            .select(GameResult::as_select())
            .into_boxed();
        if let Some(mode) = mode {
            query = query.filter(schema::game_results::mode.eq(mode.to_string()));
        }
        let results = query.load::<GameResult>(&mut conn)?;

        let mut scores = Scoreboard::default();
        for result in &results {
            match result.parse_outcome() {
                Ok(outcome) => scores.record(outcome),
                Err(e) => warn!(result_id = result.id(), error = %e, "Skipping result"),
            }
        }

        info!(
            total = scores.total(),
            wins = scores.wins(),
            losses = scores.losses(),
            ties = scores.ties(),
            "Scoreboard computed"
        );
        Ok(scores)
    }

    /// Deletes every result. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(schema::game_results::table).execute(&mut conn)?;
        info!(removed, "Results cleared");
        Ok(removed)
    }
}
