use std::time::Duration;

use super::geometry::AreaMethod;
use super::state::{Direction, GridPos};
use crate::game::traits::TickRate;

/// Largest grid accepted, in cells.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Grid width in cells
    pub grid_width: u32,
    /// Grid height in cells
    pub grid_height: u32,
    /// Simulation tick rate in Hz (ticks per second)
    pub tick_rate_hz: u32,
    /// Side of the starting territory square, in cells
    pub starting_territory_size: u32,
    /// Start cell; the grid centre when unset
    pub start_position: Option<GridPos>,
    /// Direction the agent starts with
    pub initial_direction: Direction,
    /// How claimed area is measured for the score
    pub area_method: AreaMethod,
}

impl CaptureConfig {
    pub fn with_grid_size(width: u32, height: u32) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Grid dimensions from a viewport in pixels and a cell size in pixels.
    pub fn from_viewport(
        viewport_width: u32,
        viewport_height: u32,
        cell_size: u32,
    ) -> Result<Self, ConfigError> {
        if cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }

        let config = Self::with_grid_size(viewport_width / cell_size, viewport_height / cell_size);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.total_cells() > MAX_GRID_CELLS {
            return Err(ConfigError::GridTooLarge {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.starting_territory_size == 0 {
            return Err(ConfigError::ZeroTerritorySize);
        }

        let start = self.start_position();
        if start.x < 0
            || start.y < 0
            || start.x as u32 >= self.grid_width
            || start.y as u32 >= self.grid_height
        {
            return Err(ConfigError::StartOutOfBounds(start));
        }

        Ok(())
    }

    pub fn start_position(&self) -> GridPos {
        self.start_position.unwrap_or_else(|| {
            GridPos::new(self.grid_width as i32 / 2, self.grid_height as i32 / 2)
        })
    }

    pub fn total_cells(&self) -> u64 {
        self.grid_width as u64 * self.grid_height as u64
    }
}

impl TickRate for CaptureConfig {
    fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            grid_width: 100,
            grid_height: 100,
            tick_rate_hz: 10,
            starting_territory_size: 5,
            start_position: None,
            initial_direction: Direction::None,
            area_method: AreaMethod::BoundingBox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Grid has no cells
    EmptyGrid { width: u32, height: u32 },
    /// More than `MAX_GRID_CELLS` cells
    GridTooLarge { width: u32, height: u32 },
    /// Cell size of zero pixels
    ZeroCellSize,
    ZeroTickRate,
    ZeroTerritorySize,
    /// Start cell outside the grid
    StartOutOfBounds(GridPos),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyGrid { width, height } => {
                write!(f, "Grid must have at least one cell, got {}x{}", width, height)
            }
            ConfigError::GridTooLarge { width, height } => write!(
                f,
                "Grid {}x{} exceeds the {} cell limit",
                width, height, MAX_GRID_CELLS
            ),
            ConfigError::ZeroCellSize => write!(f, "Cell size must be positive"),
            ConfigError::ZeroTickRate => write!(f, "Tick rate must be positive"),
            ConfigError::ZeroTerritorySize => {
                write!(f, "Starting territory size must be positive")
            }
            ConfigError::StartOutOfBounds(pos) => {
                write!(f, "Start position ({}, {}) is outside the grid", pos.x, pos.y)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.grid_width, 100);
        assert_eq!(config.grid_height, 100);
        assert_eq!(config.tick_rate_hz, 10);
        assert_eq!(config.tick_duration(), Duration::from_millis(100));
        assert_eq!(config.ticks_per_second(), 10);
        assert_eq!(config.start_position(), GridPos::new(50, 50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_viewport() {
        let config = CaptureConfig::from_viewport(800, 610, 20).unwrap();
        assert_eq!(config.grid_width, 40);
        assert_eq!(config.grid_height, 30);
        assert_eq!(config.total_cells(), 1200);
    }

    #[test]
    fn test_from_viewport_rejects_bad_sizes() {
        assert_eq!(
            CaptureConfig::from_viewport(800, 600, 0).unwrap_err(),
            ConfigError::ZeroCellSize
        );
        assert_eq!(
            CaptureConfig::from_viewport(10, 600, 20).unwrap_err(),
            ConfigError::EmptyGrid { width: 0, height: 30 }
        );
    }

    #[test]
    fn test_oversized_grid_rejected() {
        assert_eq!(
            CaptureConfig::with_grid_size(70_000, 70_000).validate(),
            Err(ConfigError::GridTooLarge { width: 70_000, height: 70_000 })
        );
        assert!(CaptureConfig::with_grid_size(4096, 4096).validate().is_ok());
        assert!(matches!(
            CaptureConfig::with_grid_size(4097, 4096).validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate() {
        let mut config = CaptureConfig::with_grid_size(10, 10);
        config.tick_rate_hz = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickRate));

        let mut config = CaptureConfig::with_grid_size(10, 10);
        config.starting_territory_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTerritorySize));

        let mut config = CaptureConfig::with_grid_size(10, 10);
        config.start_position = Some(GridPos::new(10, 3));
        assert_eq!(
            config.validate(),
            Err(ConfigError::StartOutOfBounds(GridPos::new(10, 3)))
        );
    }
}
