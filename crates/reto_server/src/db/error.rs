//! Database error types.

use derive_more::{Display, Error};

/// Which step of a database call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DbErrorKind {
    /// Opening the SQLite file.
    Connection,
    /// Applying embedded migrations.
    Migration,
    /// Running a statement.
    Query,
    /// A stored value could not be decoded.
    InvalidData,
}

/// Database error with the location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("{} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failed step.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates an error of `kind` at the caller's location.
    #[track_caller]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The database could not be opened.
    #[track_caller]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Connection, message)
    }

    /// A migration failed.
    #[track_caller]
    pub fn migration(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Migration, message)
    }

    /// A column held a value the domain types reject.
    #[track_caller]
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::InvalidData, message)
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbErrorKind::Query, err.to_string())
    }
}
