use std::sync::Arc;
use std::time::Duration;

use mnemo_core::{BoardGenerator, Coord, GameEngine, GuessOutcome, Result, ShuffledBoardGenerator};
use rand::prelude::*;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;

/// One-shot notifications, delivered at most once per occurrence to the
/// listeners registered at emission time. Never replayed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GameEvent {
    Won,
    /// Reserved: no current rule ends a level in defeat.
    Lost,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long the face-up memorize phase lasts before cells are hidden.
    pub preview_delay: Duration,
    /// Fixed seed for reproducible boards; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preview_delay: Duration::from_millis(2500),
            seed: None,
        }
    }
}

struct Shared {
    engine: GameEngine,
    rng: SmallRng,
    /// Bumped on every level start; a preview timer only applies its update
    /// when the epoch it was spawned under is still current.
    epoch: u64,
    preview_task: Option<JoinHandle<()>>,
    event_senders: Vec<mpsc::UnboundedSender<GameEvent>>,
}

impl Shared {
    fn emit(&mut self, event: GameEvent) {
        self.event_senders
            .retain(|sender| sender.send(event).is_ok());
    }
}

/// Owns a [`GameEngine`] behind a single-writer lock and publishes an
/// immutable snapshot after every transition.
///
/// Must live inside a Tokio runtime; [`GameSession::start_level`] spawns
/// the preview timer onto it.
pub struct GameSession {
    shared: Arc<Mutex<Shared>>,
    state_tx: watch::Sender<GameEngine>,
    preview_delay: Duration,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        let engine = GameEngine::new();
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        let (state_tx, _) = watch::channel(engine.clone());

        Self {
            shared: Arc::new(Mutex::new(Shared {
                engine,
                rng,
                epoch: 0,
                preview_task: None,
                event_senders: Vec::new(),
            })),
            state_tx,
            preview_delay: config.preview_delay,
        }
    }

    /// Latest-value snapshot stream; a late subscriber sees the current
    /// snapshot, not a history.
    pub fn subscribe(&self) -> watch::Receiver<GameEngine> {
        self.state_tx.subscribe()
    }

    /// One-shot event stream carrying [`GameEvent`]s from this point on.
    pub async fn subscribe_events(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.shared.lock().await.event_senders.push(sender);
        receiver
    }

    /// The most recent snapshot.
    pub fn state(&self) -> GameEngine {
        self.state_tx.borrow().clone()
    }

    /// Advance to the next level: grow the board, deal it face up, and
    /// schedule the timer that hides it once the memorize phase is over.
    ///
    /// A preview timer still pending from the previous level is cancelled,
    /// so a stale timer can never clobber the new board.
    pub async fn start_level(&self) -> Result<()> {
        let mut shared = self.shared.lock().await;

        if let Some(task) = shared.preview_task.take() {
            task.abort();
        }
        shared.epoch += 1;
        let epoch = shared.epoch;

        let seed = shared.rng.random();
        let cell_count = shared.engine.next_cell_count();
        let layout = ShuffledBoardGenerator::new(seed).generate(cell_count)?;
        shared.engine.start_level(layout);
        self.state_tx.send_replace(shared.engine.clone());
        log::debug!("level {} dealt, preview for {:?}", shared.engine.level(), self.preview_delay);

        let shared_handle = Arc::clone(&self.shared);
        let state_tx = self.state_tx.clone();
        let delay = self.preview_delay;
        shared.preview_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut shared = shared_handle.lock().await;
            if shared.epoch != epoch {
                log::warn!("stale preview timer skipped");
                return;
            }
            if shared.engine.end_preview() {
                state_tx.send_replace(shared.engine.clone());
            }
            shared.preview_task = None;
        }));

        Ok(())
    }

    /// Forward a cell selection into the resolver and publish the result.
    pub async fn guess(&self, column: Coord, row: Coord) -> Result<GuessOutcome> {
        let mut shared = self.shared.lock().await;
        let outcome = shared.engine.guess((column, row))?;
        log::debug!("guess ({}, {}) -> {:?}", column, row, outcome);

        if outcome.has_update() {
            self.state_tx.send_replace(shared.engine.clone());
        }
        if outcome == GuessOutcome::Won {
            shared.emit(GameEvent::Won);
        }
        Ok(outcome)
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        // best effort: a timer that survives this only touches a dead engine
        if let Ok(shared) = self.shared.try_lock() {
            if let Some(task) = &shared.preview_task {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::{CellStatus, Coord2, GameError, Progress};

    fn config(preview_ms: u64, seed: u64) -> SessionConfig {
        SessionConfig {
            preview_delay: Duration::from_millis(preview_ms),
            seed: Some(seed),
        }
    }

    /// Positions of both cells of every pair, read from a snapshot.
    fn pair_positions(state: &GameEngine) -> Vec<(Coord2, Coord2)> {
        let (columns, rows) = state.size();
        let mut by_value: std::collections::BTreeMap<u16, Vec<Coord2>> = Default::default();
        for row in 0..rows {
            for column in 0..columns {
                let coords = (column, row);
                by_value
                    .entry(state.cell_at(coords).value)
                    .or_default()
                    .push(coords);
            }
        }
        by_value.into_values().map(|v| (v[0], v[1])).collect()
    }

    async fn wait_until_hidden(rx: &mut watch::Receiver<GameEngine>) {
        while rx.borrow_and_update().preview_mode() {
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn first_level_is_dealt_face_up() {
        let session = GameSession::new(config(10_000, 1));
        session.start_level().await.unwrap();

        let state = session.state();
        assert_eq!(state.level(), 1);
        assert_eq!(state.total_cells(), 4);
        assert_eq!(state.size(), (2, 2));
        assert!(state.preview_mode());
        assert_eq!(state.cell_at((0, 0)).status, CellStatus::Opened);
        assert_eq!(state.cell_at((1, 1)).status, CellStatus::Opened);
    }

    #[tokio::test(start_paused = true)]
    async fn preview_timer_hides_the_board() {
        let session = GameSession::new(config(100, 2));
        let mut rx = session.subscribe();
        session.start_level().await.unwrap();

        wait_until_hidden(&mut rx).await;

        let state = session.state();
        assert!(!state.preview_mode());
        assert_eq!(state.cell_at((0, 0)).status, CellStatus::Closed);
        assert_eq!(state.cell_at((1, 1)).status, CellStatus::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_preview_timer_never_touches_the_next_board() {
        let session = GameSession::new(config(100, 3));
        session.start_level().await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        session.start_level().await.unwrap();

        // past the first timer's deadline, before the second one's
        tokio::time::sleep(Duration::from_millis(60)).await;
        let state = session.state();
        assert_eq!(state.level(), 2);
        assert_eq!(state.total_cells(), 8);
        assert!(state.preview_mode());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!session.state().preview_mode());
    }

    #[tokio::test(start_paused = true)]
    async fn guesses_are_ignored_until_the_preview_ends() {
        let session = GameSession::new(config(100, 4));
        let mut rx = session.subscribe();
        session.start_level().await.unwrap();

        assert_eq!(session.guess(0, 0).await, Ok(GuessOutcome::NoChange));

        wait_until_hidden(&mut rx).await;
        assert_eq!(session.guess(0, 0).await, Ok(GuessOutcome::Opened));
    }

    #[tokio::test]
    async fn guess_errors_pass_through() {
        let session = GameSession::new(config(10, 5));
        assert_eq!(session.guess(0, 0).await, Err(GameError::NotStarted));

        session.start_level().await.unwrap();
        assert_eq!(session.guess(9, 9).await, Err(GameError::InvalidCoords));
    }

    #[tokio::test(start_paused = true)]
    async fn winning_emits_the_event_once_and_only_to_current_listeners() {
        let session = GameSession::new(config(10, 6));
        let mut events = session.subscribe_events().await;
        let mut rx = session.subscribe();
        session.start_level().await.unwrap();
        wait_until_hidden(&mut rx).await;

        let pairs = pair_positions(&session.state());
        let mut last = GuessOutcome::NoChange;
        for (a, b) in pairs {
            session.guess(a.0, a.1).await.unwrap();
            last = session.guess(b.0, b.1).await.unwrap();
        }
        assert_eq!(last, GuessOutcome::Won);
        assert_eq!(session.state().progress(), Progress::Win);

        assert_eq!(events.try_recv(), Ok(GameEvent::Won));
        assert!(events.try_recv().is_err());

        // subscribing after the fact replays nothing
        let mut late = session.subscribe_events().await;
        assert!(late.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_follow_every_transition() {
        let session = GameSession::new(config(100, 7));
        let mut rx = session.subscribe();
        assert_eq!(rx.borrow().level(), 0);

        session.start_level().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().level(), 1);

        wait_until_hidden(&mut rx).await;

        session.guess(0, 0).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().cell_at((0, 0)).status,
            CellStatus::Opened
        );
    }

    #[tokio::test(start_paused = true)]
    async fn score_carries_into_the_next_level() {
        let session = GameSession::new(config(10, 8));
        let mut rx = session.subscribe();
        session.start_level().await.unwrap();
        wait_until_hidden(&mut rx).await;

        for (a, b) in pair_positions(&session.state()) {
            session.guess(a.0, a.1).await.unwrap();
            session.guess(b.0, b.1).await.unwrap();
        }
        assert_eq!(session.state().score(), 2);

        session.start_level().await.unwrap();
        let state = session.state();
        assert_eq!(state.level(), 2);
        assert_eq!(state.score(), 2);
        assert_eq!(state.found_count(), 0);
        assert_eq!(state.total_cells(), 8);
    }

    #[tokio::test]
    async fn seeded_sessions_deal_identical_boards() {
        let a = GameSession::new(config(10_000, 9));
        let b = GameSession::new(config(10_000, 9));
        a.start_level().await.unwrap();
        b.start_level().await.unwrap();

        assert_eq!(a.state(), b.state());
    }
}
