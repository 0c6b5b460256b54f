//! Reto server library: online game store, local game driver and
//! results log for reto tic-tac-toe.
//!
//! # Architecture
//!
//! - **Store**: shared online games with subscriptions ([`GameStore`], [`MemoryGameStore`])
//! - **Online**: one player's side of a stored game ([`OnlineSession`])
//! - **Local**: game against the computer with a thinking delay ([`LocalGame`])
//! - **Results**: finished games and the scoreboard in SQLite ([`ResultsService`])
//! - **Server**: HTTP JSON API over a store ([`router`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reto_server::{MemoryGameStore, OnlineSession};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = Arc::new(MemoryGameStore::new());
//! let host = OnlineSession::host(store.clone()).await?;
//! let _guest = OnlineSession::join(store, host.game().game_id()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod local;
mod online;
mod results_service;
mod server;
mod store;

// Crate-level exports - Configuration
pub use config::{ConfigError, RetoConfig};

// Crate-level exports - Database
pub use db::{DbError, DbErrorKind, GameResult, MIGRATIONS, NewGameResult, ResultsRepository};

// Crate-level exports - Drivers
pub use local::LocalGame;
pub use online::{OnlineEvent, OnlineSession};

// Crate-level exports - Results
pub use results_service::ResultsService;

// Crate-level exports - HTTP API
pub use server::{ApiError, AppState, MoveRequest, router};

// Crate-level exports - Game store
pub use store::{
    GameStore, GameUpdate, LobbyEvent, LobbySubscription, MemoryGameStore, StoreError,
    Subscription, new_game_id,
};
