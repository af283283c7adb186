use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::time::{self, Instant, MissedTickBehavior};

use super::input::InputSlot;
use crate::game::traits::Game;

/// Ticks run back to back after a stall before the backlog is dropped.
pub const MAX_CATCH_UP_TICKS: u32 = 5;

/// Turns elapsed wall time into a count of fixed-length ticks.
#[derive(Debug, Clone)]
pub struct TickClock {
    tick_duration: Duration,
    accumulated: Duration,
}

impl TickClock {
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick_duration: tick_duration.max(Duration::from_nanos(1)),
            accumulated: Duration::ZERO,
        }
    }

    /// Adds `elapsed` and returns how many ticks are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;

        let tick_nanos = self.tick_duration.as_nanos();
        let accumulated_nanos = self.accumulated.as_nanos();
        let due = accumulated_nanos / tick_nanos;
        self.accumulated = duration_from_nanos(accumulated_nanos % tick_nanos);

        if due > MAX_CATCH_UP_TICKS as u128 {
            tracing::debug!("Dropping {} overdue ticks", due - MAX_CATCH_UP_TICKS as u128);
            MAX_CATCH_UP_TICKS
        } else {
            due as u32
        }
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    // Below one tick, so the seconds always fit in a u64
    Duration::new((nanos / NANOS_PER_SEC) as u64, (nanos % NANOS_PER_SEC) as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The game reached its terminal state
    GameOver,
    /// Stopped from outside
    Stopped,
    /// The driver task panicked or was cancelled
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub session_id: u32,
    /// Ticks simulated
    pub ticks: u32,
    pub final_score: Option<f64>,
    pub end: SessionEnd,
}

/// Drives `game` at its tick rate until it ends or `stop` fires.
///
/// Before each tick the pending input is handed to the game. Every tick's
/// encoded state is published on `snapshots`.
pub async fn run<G: Game>(
    session_id: u32,
    mut game: G,
    input: Arc<InputSlot>,
    snapshots: watch::Sender<Vec<u8>>,
    mut stop: oneshot::Receiver<()>,
) -> SessionReport {
    let tick_duration = game.tick_rate();
    let mut clock = TickClock::new(tick_duration);
    let mut interval = time::interval(tick_duration);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last = Instant::now();
    let mut ticks = 0;

    loop {
        tokio::select! {
            biased;

            _ = &mut stop => {
                tracing::info!("Session {} stopped after {} ticks", session_id, ticks);
                return SessionReport {
                    session_id,
                    ticks,
                    final_score: game.final_score(),
                    end: SessionEnd::Stopped,
                };
            }

            _ = interval.tick() => {
                let now = Instant::now();
                let due = clock.advance(now.duration_since(last));
                last = now;

                for _ in 0..due {
                    if let Some(bytes) = input.take() {
                        if let Err(e) = game.handle_input(&bytes) {
                            tracing::debug!("Session {} dropped input: {}", session_id, e);
                        }
                    }

                    let result = game.tick();
                    ticks += 1;

                    if let Some(state) = result.broadcast {
                        snapshots.send_replace(state);
                    }

                    if let Some(score) = result.game_over {
                        tracing::info!(
                            "Session {} finished after {} ticks with {:.2}%",
                            session_id,
                            ticks,
                            score
                        );
                        return SessionReport {
                            session_id,
                            ticks,
                            final_score: Some(score),
                            end: SessionEnd::GameOver,
                        };
                    }
                }

                tracing::trace!("Session {} at tick {}", session_id, ticks);
            }
        }
    }
}
