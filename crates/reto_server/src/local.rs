//! Driver for a game against the computer.

use std::time::Duration;

use reto_tictactoe::{EngineEvent, EngineSnapshot, GameOutcome, Handled, TurnEngine, TurnPhase};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Runs a [`TurnEngine`], inserting the computer's thinking delay and
/// publishing every state change.
#[derive(Debug)]
pub struct LocalGame {
    engine: TurnEngine,
    delay: Duration,
    updates: watch::Sender<EngineSnapshot>,
}

impl LocalGame {
    /// Wraps an engine. The computer waits `delay` before each move.
    pub fn new(engine: TurnEngine, delay: Duration) -> Self {
        let (updates, _) = watch::channel(engine.snapshot());
        Self {
            engine,
            delay,
            updates,
        }
    }

    /// Receives every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.updates.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.engine.snapshot()
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// Handles `event`, then lets the computer move if it is its turn.
    ///
    /// Returns the outcome if the game ended during this call.
    #[instrument(skip(self))]
    pub async fn dispatch(&mut self, event: EngineEvent) -> Option<GameOutcome> {
        let outcome = self.apply(event);
        outcome.or(self.settle().await)
    }

    /// Plays the computer's pending move, if any, after the delay.
    ///
    /// Needed once after construction when the computer opens the game.
    pub async fn settle(&mut self) -> Option<GameOutcome> {
        let mut outcome = None;
        while self.engine.phase() == TurnPhase::ComputerThinking {
            debug!(delay_ms = self.delay.as_millis() as u64, "Computer thinking");
            tokio::time::sleep(self.delay).await;
            match self.engine.handle(EngineEvent::ComputerMove) {
                Handled::Ignored => break,
                Handled::Applied => {}
                Handled::Finished(o) => outcome = Some(o),
            }
            self.publish();
        }

        outcome
    }

    fn apply(&mut self, event: EngineEvent) -> Option<GameOutcome> {
        match self.engine.handle(event) {
            Handled::Ignored => {
                debug!(?event, "Event ignored");
                None
            }
            Handled::Applied => {
                self.publish();
                None
            }
            Handled::Finished(outcome) => {
                self.publish();
                Some(outcome)
            }
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.engine.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reto_tictactoe::{DifficultyLevel, Player};

    #[tokio::test]
    async fn test_human_move_triggers_computer_reply() {
        let mut engine = TurnEngine::with_seed(DifficultyLevel::Expert, 2);
        engine.restart_with(Player::X);
        let mut game = LocalGame::new(engine, Duration::ZERO);
        let rx = game.subscribe();

        let outcome = game.dispatch(EngineEvent::HumanMove(4)).await;

        assert_eq!(outcome, None);
        let latest = rx.borrow().clone();
        assert_eq!(latest.phase, TurnPhase::AwaitingHumanMove);
        assert_eq!(latest.board.empty_cells().len(), 7);
        assert_eq!(latest, game.snapshot());
    }

    #[tokio::test]
    async fn test_ignored_move_publishes_nothing() {
        let mut engine = TurnEngine::with_seed(DifficultyLevel::Easy, 2);
        engine.restart_with(Player::X);
        let mut game = LocalGame::new(engine, Duration::ZERO);
        game.dispatch(EngineEvent::HumanMove(0)).await;

        let rx = game.subscribe();
        assert_eq!(game.dispatch(EngineEvent::HumanMove(0)).await, None);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_settle_plays_opening_computer_move() {
        let mut engine = TurnEngine::with_seed(DifficultyLevel::Harder, 5);
        engine.restart_with(Player::O);
        let mut game = LocalGame::new(engine, Duration::from_millis(1));
        assert_eq!(game.snapshot().phase, TurnPhase::ComputerThinking);

        assert_eq!(game.settle().await, None);
        assert_eq!(game.snapshot().phase, TurnPhase::AwaitingHumanMove);
        assert_eq!(game.engine().board().count(Player::O), 1);
    }
}
