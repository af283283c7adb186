use std::time::Duration;

use crate::games::capture::config::ConfigError;

pub trait TickRate {
    fn tick_duration(&self) -> Duration;

    fn ticks_per_second(&self) -> u32 {
        let nanos = self.tick_duration().as_nanos().max(1);
        (Duration::from_secs(1).as_nanos() / nanos) as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// Invalid input received
    InvalidInput(String),
    /// Game is not in a valid state for the operation
    InvalidState(String),
    /// Encoding/decoding error
    EncodingError(String),
    /// Rejected session configuration
    Config(ConfigError),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            GameError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            GameError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            GameError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for GameError {}

impl From<ConfigError> for GameError {
    fn from(e: ConfigError) -> Self {
        GameError::Config(e)
    }
}

#[derive(Debug, Default)]
pub struct TickResult {
    /// Encoded state snapshot for presentation
    pub broadcast: Option<Vec<u8>>,
    /// Final score; set on the one tick that ends the game
    pub game_over: Option<f64>,
}

pub trait Game: Send + Sync {
    fn tick(&mut self) -> TickResult;
    fn handle_input(&mut self, input: &[u8]) -> Result<(), GameError>;
    fn encode_state(&self) -> Vec<u8>;
    fn tick_rate(&self) -> Duration;
    fn is_game_over(&self) -> bool {
        false
    }
    fn final_score(&self) -> Option<f64> {
        None
    }
}
