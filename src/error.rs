//! Centralized error types for the game core.
//!
//! Gameplay itself never fails: skipped spawns and saturating clamps are treated as data.
//! These types cover scene construction, configuration, and invariants that systems
//! report instead of panicking.

use bevy_ecs::event::Event;

/// Main error type for the game core.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Problems found while loading or validating a [`crate::config::SceneConfig`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Playfield must be positive and finite, got {width}x{height}")]
    InvalidPlayfield { width: f32, height: f32 },

    #[error("Playfield width {0} leaves no room between the spawn margins")]
    PlayfieldTooNarrow(f32),

    #[error("Difficulty parameter `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("Fuel refill must be non-negative, got {0}")]
    NegativeRefill(f32),

    #[error("Car catalog is empty")]
    EmptyCatalog,
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
