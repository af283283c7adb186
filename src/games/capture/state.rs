use super::config::CaptureConfig;
use super::territory::RegionSet;
use super::trail::Trail;

/// A position on the game grid
///
/// (0,0) is the top-left corner,
/// x increases to the right, y increases downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn moved(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

impl std::ops::Sub for GridPos {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Stationary, before the first input
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

/// The single controllable agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    /// Current cell
    pub position: GridPos,
    /// Direction applied on the last tick
    pub direction: Direction,
    /// Direction to apply on the next tick
    pub queued: Direction,
    /// Whether the agent is currently outside its territory
    pub outside: bool,
}

impl Agent {
    pub fn new(position: GridPos, direction: Direction) -> Self {
        Self {
            position,
            direction,
            queued: direction,
            outside: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// Stepped off the grid
    Wall,
    /// Stepped onto its own trail
    OwnTrail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Running,
    GameOver { reason: GameOverReason, score: f64 },
}

/// Everything one session mutates. Owned by the step engine.
#[derive(Debug, Clone)]
pub struct GameState {
    pub agent: Agent,
    /// Cells visited since the agent last left its territory
    pub trail: Trail,
    /// Claimed area
    pub territory: RegionSet,
    pub phase: Phase,
    /// Claimed percentage of the grid, refreshed every tick
    pub score: f64,
    /// Ticks simulated so far
    pub tick: u32,
    width: u32,
    height: u32,
}

impl GameState {
    /// Builds the opening state. The config must already be validated.
    pub fn new(config: &CaptureConfig) -> Self {
        let start = config.start_position();
        let territory = RegionSet::starting_square(
            start,
            config.starting_territory_size,
            config.grid_width,
            config.grid_height,
        );

        Self {
            agent: Agent::new(start, config.initial_direction),
            trail: Trail::new(),
            territory,
            phase: Phase::Running,
            score: 0.0,
            tick: 0,
            width: config.grid_width,
            height: config.grid_height,
        }
    }

    pub fn grid_dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn in_bounds(&self, pos: &GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn total_cells(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_pos_operations() {
        let pos = GridPos::new(5, 10);
        assert_eq!(pos.offset(1, -1), GridPos::new(6, 9));
        assert_eq!(pos.moved(Direction::Up), GridPos::new(5, 9));
        assert_eq!(pos.moved(Direction::Right), GridPos::new(6, 10));
        assert_eq!(pos.moved(Direction::None), pos);
        assert_eq!(GridPos::new(4, 4) - GridPos::new(1, 2), GridPos::new(3, 2));
    }

    #[test]
    fn test_direction_opposite() {
        assert!(Direction::Up.is_opposite(&Direction::Down));
        assert!(Direction::Left.is_opposite(&Direction::Right));
        assert!(!Direction::Up.is_opposite(&Direction::Left));
        assert!(!Direction::None.is_opposite(&Direction::Up));
    }

    #[test]
    fn test_initial_state() {
        let config = CaptureConfig::with_grid_size(10, 10);
        let state = GameState::new(&config);

        assert_eq!(state.agent.position, GridPos::new(5, 5));
        assert_eq!(state.agent.direction, Direction::None);
        assert!(!state.agent.outside);
        assert!(state.trail.is_empty());
        assert_eq!(state.territory.len(), 1);
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.total_cells(), 100);
    }

    #[test]
    fn test_in_bounds() {
        let state = GameState::new(&CaptureConfig::with_grid_size(10, 10));
        assert!(state.in_bounds(&GridPos::new(0, 0)));
        assert!(state.in_bounds(&GridPos::new(9, 9)));
        assert!(!state.in_bounds(&GridPos::new(-1, 0)));
        assert!(!state.in_bounds(&GridPos::new(10, 5)));
        assert!(!state.in_bounds(&GridPos::new(5, 10)));
    }
}
