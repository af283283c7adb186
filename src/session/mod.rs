pub mod driver;
pub mod input;

use std::sync::Arc;

use prost::Message;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::game::traits::{Game, GameError};
use crate::games::capture::{CaptureConfig, CaptureGame, Direction, systems};
use crate::protocol::capture::{CaptureInput, CaptureState};

pub use driver::{SessionEnd, SessionReport, TickClock};
pub use input::InputSlot;

/// Called with the final score of every session that reaches game over.
pub type ScoreListener = Arc<dyn Fn(f64) + Send + Sync>;

/// A running session: its driver task plus the channels around it.
pub struct SessionHandle {
    id: u32,
    input: Arc<InputSlot>,
    snapshots: watch::Receiver<Vec<u8>>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<SessionReport>,
}

impl SessionHandle {
    /// Spawns the tick driver for `game` on the current runtime.
    pub fn spawn<G: Game + 'static>(id: u32, game: G) -> Self {
        let input = Arc::new(InputSlot::new());
        let (state_tx, state_rx) = watch::channel(game.encode_state());
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(driver::run(id, game, input.clone(), state_tx, stop_rx));

        Self {
            id,
            input,
            snapshots: state_rx,
            stop: Some(stop_tx),
            task,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Queues a turn; it is applied on the next tick.
    pub fn steer(&self, direction: Direction) {
        let input = CaptureInput {
            direction: systems::direction_to_proto(direction),
        };
        self.input.store(input.encode_to_vec());
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<u8>> {
        self.snapshots.clone()
    }

    /// Most recently published state.
    pub fn latest(&self) -> Result<CaptureState, GameError> {
        CaptureState::decode(self.snapshots.borrow().as_slice())
            .map_err(|e| GameError::EncodingError(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the driver and waits for it. No tick runs after this returns.
    pub async fn stop(mut self) -> SessionReport {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        join(self.id, self.task).await
    }

    /// Waits for the session to end by itself.
    pub async fn finished(self) -> SessionReport {
        let SessionHandle { id, stop, task, .. } = self;
        let report = join(id, task).await;
        drop(stop);
        report
    }
}

async fn join(id: u32, task: JoinHandle<SessionReport>) -> SessionReport {
    match task.await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("Session {} driver failed: {}", id, e);
            SessionReport {
                session_id: id,
                ticks: 0,
                final_score: None,
                end: SessionEnd::Aborted,
            }
        }
    }
}

/// Owns the current session. Every start builds a fresh game.
pub struct SessionManager {
    config: CaptureConfig,
    listener: Option<ScoreListener>,
    current: Option<SessionHandle>,
    next_session_id: u32,
}

impl SessionManager {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            listener: None,
            current: None,
            next_session_id: 1,
        }
    }

    pub fn with_listener(mut self, listener: ScoreListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn current(&self) -> Option<&SessionHandle> {
        self.current.as_ref()
    }

    /// Starts a new session, stopping the current one first.
    pub async fn start(&mut self) -> Result<&SessionHandle, GameError> {
        if let Some(previous) = self.current.take() {
            let report = previous.stop().await;
            tracing::debug!("Replaced session {}: {:?}", report.session_id, report.end);
        }

        let mut game = CaptureGame::with_config(self.config.clone())?;
        if let Some(listener) = &self.listener {
            let listener = listener.clone();
            game = game.on_game_over(Box::new(move |score| listener(score)));
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        tracing::info!(
            "Session {} started on a {}x{} grid",
            id,
            self.config.grid_width,
            self.config.grid_height
        );

        Ok(self.current.insert(SessionHandle::spawn(id, game)))
    }

    pub async fn restart(&mut self) -> Result<&SessionHandle, GameError> {
        tracing::info!("Restarting session");
        self.start().await
    }

    pub async fn stop(&mut self) -> Option<SessionReport> {
        let handle = self.current.take()?;
        Some(handle.stop().await)
    }

    /// Waits for the current session to end by itself.
    pub async fn wait(&mut self) -> Option<SessionReport> {
        let handle = self.current.take()?;
        Some(handle.finished().await)
    }
}
