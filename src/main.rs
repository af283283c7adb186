use std::sync::Arc;

use claimgrid::games::capture::{CaptureConfig, Direction};
use claimgrid::protocol::capture::CaptureState;
use claimgrid::session::{SessionHandle, SessionManager};
use prost::Message;

const VIEWPORT_WIDTH: u32 = 800;
const VIEWPORT_HEIGHT: u32 = 600;
const CELL_SIZE: u32 = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("claimgrid=debug".parse()?),
        )
        .init();

    let config = CaptureConfig::from_viewport(VIEWPORT_WIDTH, VIEWPORT_HEIGHT, CELL_SIZE)?;
    let mut manager = SessionManager::new(config)
        .with_listener(Arc::new(|score| tracing::info!("Game over: {:.2}% claimed", score)));

    {
        let handle = manager.start().await?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
            }
            _ = autopilot(handle) => {}
        }
    }

    if let Some(report) = manager.stop().await {
        tracing::info!(
            "Session {} ended ({:?}) after {} ticks, score {:?}",
            report.session_id,
            report.end,
            report.ticks,
            report.final_score
        );
    }

    Ok(())
}

/// Steers ever larger loops out of the starting territory until the agent
/// runs into a wall.
async fn autopilot(handle: &SessionHandle) {
    let mut snapshots = handle.subscribe();
    let mut steering = Direction::None;

    loop {
        let state = match CaptureState::decode(snapshots.borrow_and_update().as_slice()) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Undecodable snapshot: {}", e);
                break;
            }
        };

        if state.game_over {
            break;
        }

        let wanted = heading_for_tick(state.tick);
        if wanted != steering {
            handle.steer(wanted);
            steering = wanted;
        }

        if snapshots.changed().await.is_err() {
            break;
        }
    }
}

fn heading_for_tick(tick: u32) -> Direction {
    let mut remaining = tick;
    let mut side = 3;
    loop {
        for heading in [Direction::Right, Direction::Down, Direction::Left, Direction::Up] {
            if remaining < side {
                return heading;
            }
            remaining -= side;
        }
        side += 2;
    }
}
