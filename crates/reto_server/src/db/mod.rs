//! Persistence of finished games.

mod error;
mod models;
mod repository;
mod schema;

pub use error::{DbError, DbErrorKind};
pub use models::{GameResult, NewGameResult};
pub use repository::{MIGRATIONS, ResultsRepository};
