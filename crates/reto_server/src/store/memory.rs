//! In-process game store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reto_tictactoe::{GameId, GameSnapshot, Player};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::{GameStore, GameUpdate, LobbyEvent, LobbySubscription, StoreError, Subscription};

/// Buffered updates per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
struct GameEntry {
    snapshot: GameSnapshot,
    updates: broadcast::Sender<GameUpdate>,
}

#[derive(Debug)]
struct StoreState {
    games: HashMap<GameId, GameEntry>,
    lobby: broadcast::Sender<LobbyEvent>,
}

impl StoreState {
    fn entry_mut(&mut self, game_id: &str) -> Result<&mut GameEntry, StoreError> {
        self.games.get_mut(game_id).ok_or_else(|| {
            debug!(game_id, "Game not found");
            StoreError::NotFound(game_id.to_string())
        })
    }

    /// Publishes `snapshot` to the game's observers and the lobby.
    fn publish(&self, before: Option<bool>, snapshot: &GameSnapshot) {
        if let Some(entry) = self.games.get(snapshot.game_id()) {
            // Sending fails only when nobody listens.
            let _ = entry.updates.send(GameUpdate::Snapshot(snapshot.clone()));
        }
        match (before, snapshot.available()) {
            (Some(true), false) => {
                let _ = self.lobby.send(LobbyEvent::Removed(snapshot.game_id().to_string()));
            }
            (None | Some(false), true) => {
                let _ = self.lobby.send(LobbyEvent::Added(snapshot.clone()));
            }
            _ => {}
        }
    }
}

/// Game store kept in memory and shared between handles.
///
/// Clones share the same games, so one instance can back both players of a
/// local online session or every request of the HTTP server.
#[derive(Debug, Clone)]
pub struct MemoryGameStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryGameStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory game store");
        let (lobby, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(StoreState {
                games: HashMap::new(),
                lobby,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state.lock().map_err(|_| {
            warn!("Game store lock poisoned");
            StoreError::Poisoned
        })
    }

    /// Number of stored games.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.games.len())
    }

    /// Whether no games are stored.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryGameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    #[instrument(skip(self, snapshot), fields(game_id = %snapshot.game_id()))]
    async fn create_game(&self, snapshot: GameSnapshot) -> Result<GameSnapshot, StoreError> {
        let mut state = self.lock()?;
        if state.games.contains_key(snapshot.game_id()) {
            warn!("Game already exists");
            return Err(StoreError::AlreadyExists(snapshot.game_id().to_string()));
        }

        let (updates, _) = broadcast::channel(CHANNEL_CAPACITY);
        state.games.insert(
            snapshot.game_id().to_string(),
            GameEntry {
                snapshot: snapshot.clone(),
                updates,
            },
        );
        state.publish(None, &snapshot);

        info!(first = %snapshot.current_player(), "Game created");
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    async fn get_game(&self, game_id: &str) -> Result<GameSnapshot, StoreError> {
        let mut state = self.lock()?;
        Ok(state.entry_mut(game_id)?.snapshot.clone())
    }

    #[instrument(skip(self))]
    async fn list_available(&self) -> Result<Vec<GameSnapshot>, StoreError> {
        let state = self.lock()?;
        let mut games: Vec<_> = state
            .games
            .values()
            .filter(|entry| entry.snapshot.available())
            .map(|entry| entry.snapshot.clone())
            .collect();
        games.sort_by(|a, b| a.game_id().cmp(b.game_id()));
        debug!(count = games.len(), "Listed available games");
        Ok(games)
    }

    #[instrument(skip(self))]
    async fn select_game(&self, game_id: &str) -> Result<GameSnapshot, StoreError> {
        let mut state = self.lock()?;
        let entry = state.entry_mut(game_id)?;
        if !entry.snapshot.available() {
            warn!("Game already taken");
            return Err(StoreError::Unavailable(game_id.to_string()));
        }

        entry.snapshot.close();
        let snapshot = entry.snapshot.clone();
        state.publish(Some(true), &snapshot);

        info!("Game selected");
        Ok(snapshot)
    }

    #[instrument(skip(self, snapshot), fields(game_id = %snapshot.game_id()))]
    async fn submit_move(&self, snapshot: GameSnapshot) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let entry = state.entry_mut(snapshot.game_id())?;
        let before = entry.snapshot.available();
        entry.snapshot = snapshot.clone();
        state.publish(Some(before), &snapshot);

        debug!(next = %snapshot.current_player(), state = %snapshot.game_state(), "Snapshot written");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn play_move(
        &self,
        game_id: &str,
        player: Player,
        cell: usize,
    ) -> Result<GameSnapshot, StoreError> {
        let mut state = self.lock()?;
        let entry = state.entry_mut(game_id)?;

        let mut next = entry.snapshot.clone();
        next.apply_move(player, cell).map_err(|e| {
            warn!(error = %e, "Move rejected");
            StoreError::from(e)
        })?;

        let before = entry.snapshot.available();
        entry.snapshot = next.clone();
        state.publish(Some(before), &next);

        info!(state = %next.game_state(), "Move applied");
        Ok(next)
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, game_id: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let entry = state.games.remove(game_id).ok_or_else(|| {
            debug!("Game not found");
            StoreError::NotFound(game_id.to_string())
        })?;

        let _ = entry.updates.send(GameUpdate::Deleted(game_id.to_string()));
        if entry.snapshot.available() {
            let _ = state.lobby.send(LobbyEvent::Removed(game_id.to_string()));
        }

        info!("Game deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn observe(&self, game_id: &str) -> Result<Subscription, StoreError> {
        let mut state = self.lock()?;
        let entry = state.entry_mut(game_id)?;
        debug!(subscribers = entry.updates.receiver_count() + 1, "Observing game");
        Ok(Subscription::new(
            game_id.to_string(),
            entry.snapshot.clone(),
            entry.updates.subscribe(),
        ))
    }

    #[instrument(skip(self))]
    async fn observe_available(&self) -> Result<LobbySubscription, StoreError> {
        let state = self.lock()?;
        let receiver = state.lobby.subscribe();
        let mut initial: Vec<_> = state
            .games
            .values()
            .filter(|entry| entry.snapshot.available())
            .map(|entry| entry.snapshot.clone())
            .collect();
        initial.sort_by(|a, b| a.game_id().cmp(b.game_id()));
        debug!(count = initial.len(), "Observing lobby");
        Ok(LobbySubscription::new(initial, receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(id: &str) -> GameSnapshot {
        GameSnapshot::open(id.to_string(), Player::X)
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let store = MemoryGameStore::new();
        store.create_game(open("g1")).await.unwrap();
        assert_eq!(
            store.create_game(open("g1")).await,
            Err(StoreError::AlreadyExists("g1".to_string()))
        );
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_select_takes_game_once() {
        let store = MemoryGameStore::new();
        store.create_game(open("g1")).await.unwrap();

        let taken = store.select_game("g1").await.unwrap();
        assert!(!taken.available());
        assert!(store.list_available().await.unwrap().is_empty());
        assert_eq!(
            store.select_game("g1").await,
            Err(StoreError::Unavailable("g1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_play_move_rejects_without_writing() {
        let store = MemoryGameStore::new();
        store.create_game(open("g1")).await.unwrap();

        let err = store.play_move("g1", Player::O, 4).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidMove(_)));
        assert_eq!(store.get_game("g1").await.unwrap(), open("g1"));
    }

    #[tokio::test]
    async fn test_missing_game_is_not_found() {
        let store = MemoryGameStore::new();
        assert!(matches!(store.get_game("nope").await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_game("nope").await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.submit_move(open("nope")).await, Err(StoreError::NotFound(_))));
        assert!(store.is_empty().unwrap());
    }
}
