use super::config::CaptureConfig;
use super::state::{Agent, Direction, GameOverReason, GameState, GridPos, Phase};
use super::territory::RegionSet;
use super::trail::TrailStep;
use super::union::PolygonUnion;

#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// Queued direction became the current one
    Turned(Direction),
    /// Agent stepped off its territory from `from`
    LeftTerritory { from: GridPos },
    /// An excursion closed and was merged
    Claimed { area_before: f64, area_after: f64 },
    GameOver { reason: GameOverReason, score: f64 },
}

#[derive(Debug, Default)]
pub struct StepOutcome {
    pub events: Vec<StepEvent>,
}

impl StepOutcome {
    pub fn game_over(&self) -> Option<(GameOverReason, f64)> {
        self.events.iter().find_map(|event| match event {
            StepEvent::GameOver { reason, score } => Some((*reason, *score)),
            _ => None,
        })
    }
}

/// Queues `direction` for the next tick. Reversing the current direction
/// is ignored.
pub fn queue_direction(agent: &mut Agent, direction: Direction) -> bool {
    if direction == Direction::None || agent.direction.is_opposite(&direction) {
        tracing::trace!("Ignoring turn {:?} while heading {:?}", direction, agent.direction);
        return false;
    }

    agent.queued = direction;
    true
}

/// Advances the simulation by one tick.
pub fn step(state: &mut GameState, config: &CaptureConfig, union: &dyn PolygonUnion) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    if state.is_game_over() {
        return outcome;
    }
    state.tick += 1;

    if state.agent.queued != state.agent.direction {
        state.agent.direction = state.agent.queued;
        outcome.events.push(StepEvent::Turned(state.agent.direction));
    }

    if state.agent.direction == Direction::None {
        state.score = compute_score(&state.territory, config);
        return outcome;
    }

    let previous = state.agent.position;
    let candidate = previous.moved(state.agent.direction);

    if !state.in_bounds(&candidate) {
        end_game(state, config, GameOverReason::Wall, &mut outcome);
        return outcome;
    }

    if state.trail.collides(&candidate) {
        end_game(state, config, GameOverReason::OwnTrail, &mut outcome);
        return outcome;
    }

    let now_in_territory = state.territory.contains(&candidate);
    let was_outside = state.agent.outside;

    match state.trail.record_step(previous, candidate, was_outside, now_in_territory) {
        TrailStep::Departed => {
            outcome.events.push(StepEvent::LeftTerritory { from: previous });
        }
        TrailStep::Closed(Some(polygon)) => {
            let area_before = state.territory.area(config.area_method);
            state.territory = state.territory.merge_new_region(polygon, union);
            let area_after = state.territory.area(config.area_method);

            tracing::info!(
                "Claimed territory at tick {}: area {} -> {}",
                state.tick,
                area_before,
                area_after
            );
            outcome.events.push(StepEvent::Claimed { area_before, area_after });
        }
        TrailStep::Closed(None) | TrailStep::Inside | TrailStep::Extended => {}
    }

    state.agent.outside = !now_in_territory;
    state.agent.position = candidate;
    state.score = compute_score(&state.territory, config);

    outcome
}

/// Claimed percentage of the grid, within `[0, 100]`.
pub fn compute_score(territory: &RegionSet, config: &CaptureConfig) -> f64 {
    let total = config.total_cells();
    if total == 0 {
        return 0.0;
    }
    let percentage = territory.area(config.area_method) / total as f64 * 100.0;
    percentage.clamp(0.0, 100.0)
}

fn end_game(
    state: &mut GameState,
    config: &CaptureConfig,
    reason: GameOverReason,
    outcome: &mut StepOutcome,
) {
    let score = compute_score(&state.territory, config);
    state.score = score;
    state.phase = Phase::GameOver { reason, score };

    tracing::info!(
        "Game over at tick {} ({:?}) with {:.2}% claimed",
        state.tick,
        reason,
        score
    );
    outcome.events.push(StepEvent::GameOver { reason, score });
}

pub fn direction_from_proto(value: i32) -> Direction {
    match value {
        1 => Direction::Up,
        2 => Direction::Down,
        3 => Direction::Left,
        4 => Direction::Right,
        _ => Direction::None,
    }
}

pub fn direction_to_proto(direction: Direction) -> i32 {
    match direction {
        Direction::None => 0,
        Direction::Up => 1,
        Direction::Down => 2,
        Direction::Left => 3,
        Direction::Right => 4,
    }
}
