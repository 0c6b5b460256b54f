//! One player's side of an online game.

use std::sync::Arc;

use reto_tictactoe::{BOARD_SIZE, Board, GameOutcome, GameSnapshot, Player};
use tracing::{debug, info, instrument, warn};

use crate::results_service::ResultsService;
use crate::store::{GameStore, GameUpdate, StoreError, Subscription, new_game_id};

/// What happened when an update arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnlineEvent {
    /// The local snapshot was replaced. Carries the outcome when this
    /// update ended the game.
    Updated(Option<GameOutcome>),
    /// The game was deleted by the other player.
    Deleted,
}

/// A player's connection to one stored game.
///
/// The creator plays X and the joining player plays O. Every update from
/// the store replaces the local snapshot wholesale, except updates that
/// hold fewer marks than the local board, which predate a move already
/// seen here.
#[derive(Debug)]
pub struct OnlineSession {
    store: Arc<dyn GameStore>,
    me: Player,
    game: GameSnapshot,
    subscription: Option<Subscription>,
    results: Option<ResultsService>,
}

impl OnlineSession {
    /// Creates a new game with a random first player and waits for an
    /// opponent. The creator plays X.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the game cannot be written or observed.
    #[instrument(skip(store))]
    pub async fn host(store: Arc<dyn GameStore>) -> Result<Self, StoreError> {
        let first = if rand::random_bool(0.5) { Player::X } else { Player::O };
        let game = store
            .create_game(GameSnapshot::open(new_game_id(), first))
            .await?;
        info!(game_id = %game.game_id(), %first, "Hosting game");
        Self::attach(store, Player::X, game).await
    }

    /// Takes an available game. The joining player plays O.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the game is missing or already taken.
    #[instrument(skip(store))]
    pub async fn join(store: Arc<dyn GameStore>, game_id: &str) -> Result<Self, StoreError> {
        let game = store.select_game(game_id).await?;
        info!(game_id, "Joined game");
        Self::attach(store, Player::O, game).await
    }

    async fn attach(
        store: Arc<dyn GameStore>,
        me: Player,
        game: GameSnapshot,
    ) -> Result<Self, StoreError> {
        let mut subscription = store.observe(game.game_id()).await?;
        let game = subscription.take_current().unwrap_or(game);
        Ok(Self {
            store,
            me,
            game,
            subscription: Some(subscription),
            results: None,
        })
    }

    /// Records every finished game of this session in `results`.
    pub fn record_results(mut self, results: ResultsService) -> Self {
        self.results = Some(results);
        self
    }

    /// This player's mark.
    pub fn me(&self) -> Player {
        self.me
    }

    /// Latest known snapshot.
    pub fn game(&self) -> &GameSnapshot {
        &self.game
    }

    /// Whether this player moves next in a running game.
    pub fn is_my_turn(&self) -> bool {
        !self.game.game_over() && self.game.current_player() == self.me
    }

    /// Whether updates are still being received.
    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// Places this player's mark on `cell` and writes the whole snapshot.
    ///
    /// The move is checked against the local snapshot first; nothing is
    /// written when it is illegal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidMove`] for an illegal move, or the
    /// store's error if the write fails.
    #[instrument(skip(self), fields(game_id = %self.game.game_id(), me = %self.me))]
    pub async fn play(&mut self, cell: usize) -> Result<Option<GameOutcome>, StoreError> {
        let mut next = self.game.clone();
        next.apply_move(self.me, cell).map_err(|e| {
            debug!(error = %e, "Move rejected locally");
            StoreError::from(e)
        })?;

        self.store.submit_move(next.clone()).await?;
        let outcome = self.absorb(next);
        self.report(outcome);
        Ok(outcome)
    }

    /// Replaces the local snapshot. Returns the outcome for this player
    /// only on the update that ends the game.
    #[instrument(skip(self, snapshot), fields(game_id = %snapshot.game_id()))]
    pub fn absorb(&mut self, snapshot: GameSnapshot) -> Option<GameOutcome> {
        let was_over = self.game.game_over();
        self.game = snapshot;
        if was_over {
            return None;
        }
        let outcome = GameOutcome::from_state(self.game.game_state(), self.me);
        if let Some(outcome) = outcome {
            info!(%outcome, "Online game finished");
        }
        outcome
    }

    /// Waits for the next update from the store and applies it.
    ///
    /// Returns `None` when not observing or when the channel closed.
    pub async fn next_update(&mut self) -> Option<OnlineEvent> {
        loop {
            let update = self.subscription.as_mut()?.next().await;
            match update {
                Some(GameUpdate::Snapshot(snapshot)) => {
                    if marks(snapshot.board()) < marks(self.game.board()) {
                        debug!(game_id = %snapshot.game_id(), "Skipping stale snapshot");
                        continue;
                    }
                    let outcome = self.absorb(snapshot);
                    self.report(outcome);
                    return Some(OnlineEvent::Updated(outcome));
                }
                Some(GameUpdate::Deleted(game_id)) => {
                    info!(%game_id, "Game deleted remotely");
                    self.subscription = None;
                    return Some(OnlineEvent::Deleted);
                }
                None => {
                    self.subscription = None;
                    return None;
                }
            }
        }
    }

    fn report(&self, outcome: Option<GameOutcome>) {
        let (Some(results), Some(outcome)) = (&self.results, outcome) else {
            return;
        };
        let game_id = self.game.game_id();
        if let Err(e) = results.record_online_game(outcome, game_id, marks(self.game.board())) {
            warn!(game_id, error = %e, "Failed to record online result");
        }
    }

    /// Stops receiving updates. The game stays in the store.
    #[instrument(skip(self), fields(game_id = %self.game.game_id()))]
    pub fn stop_observing(&mut self) {
        if self.subscription.take().is_some() {
            debug!("Stopped observing");
        }
    }

    /// Stops observing and deletes the game.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails for a reason other than
    /// the game already being gone.
    #[instrument(skip(self), fields(game_id = %self.game.game_id()))]
    pub async fn leave(mut self) -> Result<(), StoreError> {
        self.stop_observing();
        match self.store.delete_game(self.game.game_id()).await {
            Ok(()) | Err(StoreError::NotFound(_)) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Failed to delete game");
                Err(e)
            }
        }
    }
}

fn marks(board: &Board) -> usize {
    BOARD_SIZE - board.empty_cells().len()
}
