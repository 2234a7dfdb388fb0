//! Scene configuration.
//!
//! Every field has a default, so an empty environment yields a playable phone-sized scene.
//! Values can be overridden through `DRIVEFAST_*` environment variables; nested tables use
//! a double underscore (`DRIVEFAST_DIFFICULTY__CAR_SPAWN_INTERVAL=1.2`).

use figment::{providers::Env, Figment};
use glam::Vec2;
use serde::Deserialize;

use crate::constants::{layout, mechanics, DEFAULT_PLAYFIELD};
use crate::error::ConfigError;
use crate::systems::difficulty::{DifficultyParameters, EscalationStep};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DRIVEFAST_";

/// The class of device the scene is laid out for.
///
/// Wide-aspect devices get more lanes, smaller pickups, static road lines and a second
/// car attempt per spawn tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Phone,
    Tablet,
}

impl DeviceClass {
    pub fn is_wide(self) -> bool {
        matches!(self, DeviceClass::Tablet)
    }

    /// Lane count used for road-line layout and car scaling.
    pub fn scale_ratio(self) -> f32 {
        match self {
            DeviceClass::Phone => layout::PHONE_SCALE_RATIO,
            DeviceClass::Tablet => layout::TABLET_SCALE_RATIO,
        }
    }

    pub fn pickup_divisor(self) -> f32 {
        match self {
            DeviceClass::Phone => layout::PHONE_PICKUP_DIVISOR,
            DeviceClass::Tablet => layout::TABLET_PICKUP_DIVISOR,
        }
    }
}

/// Tunables for a single game scene.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Playfield width, in points.
    pub width: f32,
    /// Playfield height, in points.
    pub height: f32,
    pub device: DeviceClass,
    /// Catalog index of the car the player drives (a persisted user setting).
    pub player_car: u8,
    /// Seed for spawn randomness. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Starting difficulty.
    pub difficulty: DifficultyParameters,
    /// Applied on every escalation.
    pub escalation: EscalationStep,
    /// Fuel granted when the player touches a fuel pickup. Zero keeps pickups inert.
    pub fuel_pickup_refill: f32,
    /// Skip traffic cars whose asset has no collision shape.
    pub enforce_collision_shapes: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_PLAYFIELD.x,
            height: DEFAULT_PLAYFIELD.y,
            device: DeviceClass::default(),
            player_car: 0,
            seed: None,
            difficulty: DifficultyParameters::default(),
            escalation: EscalationStep::default(),
            fuel_pickup_refill: 0.0,
            enforce_collision_shapes: !cfg!(debug_assertions),
        }
    }
}

impl SceneConfig {
    /// Loads the configuration from `DRIVEFAST_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Figment::from(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: SceneConfig = figment.extract().map_err(|e| ConfigError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn playfield(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.width, self.height);
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(ConfigError::InvalidPlayfield { width, height });
        }

        if width <= mechanics::SPAWN_MARGIN * 2.0 {
            return Err(ConfigError::PlayfieldTooNarrow(width));
        }

        self.difficulty.validate()?;
        self.escalation.validate()?;

        if self.fuel_pickup_refill.is_nan() || self.fuel_pickup_refill < 0.0 {
            return Err(ConfigError::NegativeRefill(self.fuel_pickup_refill));
        }

        Ok(())
    }
}
