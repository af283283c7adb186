pub mod config;
pub mod geometry;
pub mod state;
pub mod systems;
pub mod territory;
pub mod trail;
pub mod union;

use std::time::Duration;

use prost::Message;
use crate::game::traits::{Game, GameError, TickRate, TickResult};
use crate::protocol::capture::{self as proto, CaptureInput, CaptureState, EndReason};

pub use config::{CaptureConfig, ConfigError};
pub use geometry::{AreaMethod, Polygon, Ring};
pub use state::{Direction, GameOverReason, GameState, GridPos, Phase};
pub use territory::RegionSet;
pub use trail::Trail;
pub use union::{GeometryError, LatticeUnion, PolygonUnion};

/// Receives the final score once, when the game ends.
pub type GameOverCallback = Box<dyn FnOnce(f64) + Send + Sync>;

pub struct CaptureGame {
    /// Current game state
    state: GameState,
    /// Game configuration
    config: CaptureConfig,
    /// Merge strategy for claimed regions
    union: Box<dyn PolygonUnion>,
    on_game_over: Option<GameOverCallback>,
}

impl CaptureGame {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(CaptureConfig::default())
    }

    pub fn with_config(config: CaptureConfig) -> Result<Self, ConfigError> {
        let union = LatticeUnion::new(config.grid_width, config.grid_height);
        Self::with_union(config, Box::new(union))
    }

    pub fn with_union(
        config: CaptureConfig,
        union: Box<dyn PolygonUnion>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut state = GameState::new(&config);
        state.score = systems::compute_score(&state.territory, &config);

        tracing::debug!(
            "New {}x{} game, agent at {:?}",
            config.grid_width,
            config.grid_height,
            state.agent.position
        );

        Ok(Self {
            state,
            config,
            union,
            on_game_over: None,
        })
    }

    pub fn on_game_over(mut self, callback: GameOverCallback) -> Self {
        self.on_game_over = Some(callback);
        self
    }

    pub fn current_tick(&self) -> u32 {
        self.state.tick
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn score(&self) -> f64 {
        self.state.score
    }

    /// Queues a turn for the next tick; a reversal is silently dropped.
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        if self.state.is_game_over() {
            return false;
        }
        systems::queue_direction(&mut self.state.agent, direction)
    }

    pub fn snapshot(&self) -> CaptureState {
        let state = &self.state;
        let (grid_width, grid_height) = state.grid_dimensions();
        let reason = match state.phase {
            Phase::Running => EndReason::Running,
            Phase::GameOver { reason: GameOverReason::Wall, .. } => EndReason::Wall,
            Phase::GameOver { reason: GameOverReason::OwnTrail, .. } => EndReason::OwnTrail,
        };

        CaptureState {
            tick: state.tick,
            position: Some(point_to_proto(&state.agent.position)),
            direction: systems::direction_to_proto(state.agent.direction),
            queued: systems::direction_to_proto(state.agent.queued),
            trail: state.trail.points().iter().map(point_to_proto).collect(),
            regions: state
                .territory
                .polygons()
                .iter()
                .map(|polygon| proto::Region {
                    rings: polygon
                        .rings()
                        .iter()
                        .map(|ring| proto::Ring {
                            points: ring.points().iter().map(point_to_proto).collect(),
                        })
                        .collect(),
                })
                .collect(),
            outside: state.agent.outside,
            game_over: state.is_game_over(),
            score: state.score,
            reason: reason as i32,
            grid_width,
            grid_height,
        }
    }
}

fn point_to_proto(pos: &GridPos) -> proto::Point {
    proto::Point { x: pos.x, y: pos.y }
}

impl Game for CaptureGame {
    fn tick(&mut self) -> TickResult {
        let mut result = TickResult::default();
        if self.state.is_game_over() {
            return result;
        }

        let outcome = systems::step(&mut self.state, &self.config, self.union.as_ref());

        if let Some((reason, score)) = outcome.game_over() {
            tracing::info!("Session ended by {:?}, final score {:.2}", reason, score);
            result.game_over = Some(score);
            if let Some(callback) = self.on_game_over.take() {
                callback(score);
            }
        }

        result.broadcast = Some(self.encode_state());
        result
    }

    fn handle_input(&mut self, input: &[u8]) -> Result<(), GameError> {
        let capture_input = CaptureInput::decode(input)
            .map_err(|e| GameError::InvalidInput(format!("Failed to decode input: {}", e)))?;

        if self.state.is_game_over() {
            return Err(GameError::InvalidState("Game is over".to_string()));
        }

        let direction = systems::direction_from_proto(capture_input.direction);
        self.queue_direction(direction);
        Ok(())
    }

    fn encode_state(&self) -> Vec<u8> {
        self.snapshot().encode_to_vec()
    }

    fn tick_rate(&self) -> Duration {
        self.config.tick_duration()
    }

    fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    fn final_score(&self) -> Option<f64> {
        match self.state.phase {
            Phase::GameOver { score, .. } => Some(score),
            Phase::Running => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::capture::Heading;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn input(heading: Heading) -> Vec<u8> {
        CaptureInput { direction: heading as i32 }.encode_to_vec()
    }

    #[test]
    fn test_game_creation() {
        let game = CaptureGame::new().unwrap();
        assert_eq!(game.current_tick(), 0);
        assert_eq!(game.config().grid_width, 100);
        assert!((game.score() - 0.25).abs() < 1e-9);
        assert!(!game.is_game_over());
        assert_eq!(game.final_score(), None);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let result = CaptureGame::with_config(CaptureConfig::with_grid_size(0, 10));
        assert!(matches!(result, Err(ConfigError::EmptyGrid { .. })));
    }

    #[test]
    fn test_tick_rate() {
        let game = CaptureGame::new().unwrap();
        assert_eq!(game.tick_rate(), Duration::from_millis(100));
    }

    #[test]
    fn test_handle_input_direction() {
        let mut game = CaptureGame::new().unwrap();

        game.handle_input(&input(Heading::Up)).unwrap();
        assert_eq!(game.state().agent.queued, Direction::Up);

        game.tick();
        assert_eq!(game.state().agent.direction, Direction::Up);
    }

    #[test]
    fn test_handle_input_rejects_garbage() {
        let mut game = CaptureGame::new().unwrap();
        let result = game.handle_input(&[0xFF, 0xFF, 0xFF]);
        assert!(matches!(result, Err(GameError::InvalidInput(_))));
    }

    #[test]
    fn test_full_tick_with_movement() {
        let mut game = CaptureGame::new().unwrap();
        let initial_pos = game.state().agent.position;

        game.handle_input(&input(Heading::Right)).unwrap();
        let result = game.tick();

        let new_pos = game.state().agent.position;
        assert_eq!(new_pos.x, initial_pos.x + 1);
        assert_eq!(new_pos.y, initial_pos.y);
        assert!(result.broadcast.is_some());
        assert!(result.game_over.is_none());
    }

    #[test]
    fn test_game_over_callback_fires_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();

        let mut config = CaptureConfig::with_grid_size(10, 10);
        config.initial_direction = Direction::Right;
        let mut game = CaptureGame::with_config(config)
            .unwrap()
            .on_game_over(Box::new(move |score| {
                assert_eq!(score, 25.0);
                seen.fetch_add(1, Ordering::SeqCst);
            }));

        let mut final_scores = Vec::new();
        for _ in 0..10 {
            if let Some(score) = game.tick().game_over {
                final_scores.push(score);
            }
        }

        assert_eq!(final_scores, vec![25.0]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(game.final_score(), Some(25.0));
        assert!(matches!(
            game.handle_input(&input(Heading::Up)),
            Err(GameError::InvalidState(_))
        ));
    }

    #[test]
    fn test_encode_state() {
        let mut game = CaptureGame::with_config(CaptureConfig::with_grid_size(10, 10)).unwrap();
        game.handle_input(&input(Heading::Right)).unwrap();
        game.tick();
        game.tick();
        game.tick();

        let decoded = CaptureState::decode(game.encode_state().as_slice()).unwrap();
        assert_eq!(decoded.tick, 3);
        assert_eq!(decoded.position, Some(proto::Point { x: 8, y: 5 }));
        assert_eq!(decoded.direction, Heading::Right as i32);
        assert!(decoded.outside);
        assert_eq!(decoded.trail, vec![proto::Point { x: 7, y: 5 }]);
        assert_eq!(decoded.regions.len(), 1);
        assert_eq!(decoded.regions[0].rings[0].points.len(), 5);
        assert_eq!(decoded.score, 25.0);
        assert_eq!(decoded.reason, EndReason::Running as i32);
        assert_eq!((decoded.grid_width, decoded.grid_height), (10, 10));
    }

    #[test]
    fn test_custom_union_is_used() {
        struct Refusing;
        impl PolygonUnion for Refusing {
            fn union(&self, _polygons: &[Polygon]) -> Result<Vec<Polygon>, GeometryError> {
                Err(GeometryError::EmptyResult)
            }
        }

        let mut config = CaptureConfig::with_grid_size(20, 20);
        config.start_position = Some(GridPos::new(5, 5));
        let mut game = CaptureGame::with_union(config, Box::new(Refusing)).unwrap();
        game.state_mut().agent.position = GridPos::new(7, 5);

        for (direction, ticks) in [
            (Direction::Right, 2),
            (Direction::Down, 2),
            (Direction::Left, 2),
        ] {
            game.queue_direction(direction);
            for _ in 0..ticks {
                game.tick();
            }
        }

        // Fallback keeps the new region alongside the old one
        assert_eq!(game.state().territory.len(), 2);
        assert!(game.state().territory.contains(&GridPos::new(8, 5)));
        assert!(!game.is_game_over());
    }
}
