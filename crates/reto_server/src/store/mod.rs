//! Shared storage for online games.
//!
//! A store holds one [`GameSnapshot`] per game. Writes replace the whole
//! snapshot (last write wins) and every write is pushed to the game's
//! subscribers as a full replacement. A second channel carries lobby
//! changes: games becoming available or going away.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::MemoryGameStore;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reto_tictactoe::{GameId, GameSnapshot, Player};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Change pushed to the observers of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GameUpdate {
    /// The game was written; this is its full new state.
    Snapshot(GameSnapshot),
    /// The game was deleted. No further updates follow.
    Deleted(GameId),
}

/// Change pushed to lobby observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LobbyEvent {
    /// A game became available to join.
    Added(GameSnapshot),
    /// A game was taken or deleted.
    Removed(GameId),
}

/// Returns a fresh random game id.
pub fn new_game_id() -> GameId {
    format!("game_{:016x}", rand::random::<u64>())
}

/// Storage backend for online games.
#[async_trait]
pub trait GameStore: Send + Sync + std::fmt::Debug {
    /// Stores a new game.
    async fn create_game(&self, snapshot: GameSnapshot) -> Result<GameSnapshot, StoreError>;

    /// Current state of a game.
    async fn get_game(&self, game_id: &str) -> Result<GameSnapshot, StoreError>;

    /// Games waiting for a second player.
    async fn list_available(&self) -> Result<Vec<GameSnapshot>, StoreError>;

    /// Takes an available game, marking it unavailable.
    async fn select_game(&self, game_id: &str) -> Result<GameSnapshot, StoreError>;

    /// Replaces the stored snapshot as-is. Last write wins.
    async fn submit_move(&self, snapshot: GameSnapshot) -> Result<(), StoreError>;

    /// Applies `player`'s move against the stored snapshot, rejecting
    /// illegal moves without writing.
    async fn play_move(
        &self,
        game_id: &str,
        player: Player,
        cell: usize,
    ) -> Result<GameSnapshot, StoreError>;

    /// Removes a game and notifies its observers.
    async fn delete_game(&self, game_id: &str) -> Result<(), StoreError>;

    /// Subscribes to a game. The current snapshot is delivered first.
    async fn observe(&self, game_id: &str) -> Result<Subscription, StoreError>;

    /// Subscribes to lobby changes.
    async fn observe_available(&self) -> Result<LobbySubscription, StoreError>;
}

/// Receives the updates of one game until dropped.
#[derive(Debug)]
pub struct Subscription {
    game_id: GameId,
    pending: Option<GameSnapshot>,
    receiver: broadcast::Receiver<GameUpdate>,
}

impl Subscription {
    pub(crate) fn new(
        game_id: GameId,
        current: GameSnapshot,
        receiver: broadcast::Receiver<GameUpdate>,
    ) -> Self {
        Self {
            game_id,
            pending: Some(current),
            receiver,
        }
    }

    /// Id of the observed game.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Takes the snapshot captured when the subscription started, if it
    /// has not been delivered yet.
    pub fn take_current(&mut self) -> Option<GameSnapshot> {
        self.pending.take()
    }

    /// Waits for the next update. `None` once the game is gone.
    pub async fn next(&mut self) -> Option<GameUpdate> {
        if let Some(current) = self.pending.take() {
            return Some(GameUpdate::Snapshot(current));
        }
        loop {
            match self.receiver.recv().await {
                Ok(update) => return Some(update),
                // Each update is a full snapshot, so skipping ahead is fine.
                Err(RecvError::Lagged(skipped)) => {
                    warn!(game_id = %self.game_id, skipped, "Subscriber lagged");
                }
                Err(RecvError::Closed) => {
                    debug!(game_id = %self.game_id, "Update channel closed");
                    return None;
                }
            }
        }
    }

    /// Converts into a stream of updates.
    pub fn into_stream(self) -> BoxStream<'static, GameUpdate> {
        stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|update| (update, sub))
        })
        .boxed()
    }
}

/// Receives lobby changes until dropped.
#[derive(Debug)]
pub struct LobbySubscription {
    initial: Vec<GameSnapshot>,
    receiver: broadcast::Receiver<LobbyEvent>,
}

impl LobbySubscription {
    pub(crate) fn new(initial: Vec<GameSnapshot>, receiver: broadcast::Receiver<LobbyEvent>) -> Self {
        Self { initial, receiver }
    }

    /// Games that were available when the subscription started.
    pub fn initial(&self) -> &[GameSnapshot] {
        &self.initial
    }

    /// Waits for the next lobby change.
    pub async fn next(&mut self) -> Option<LobbyEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Lobby subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Converts into a stream that first replays the initial games as
    /// [`LobbyEvent::Added`], then yields live changes.
    pub fn into_stream(mut self) -> BoxStream<'static, LobbyEvent> {
        let initial: Vec<_> = std::mem::take(&mut self.initial)
            .into_iter()
            .map(LobbyEvent::Added)
            .collect();
        let changes = stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|event| (event, sub))
        });
        stream::iter(initial).chain(changes).boxed()
    }
}
