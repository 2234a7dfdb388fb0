//! Spawn-rate and speed tuning, tightened every time the score crosses a boundary.

use bevy_ecs::resource::Resource;
use serde::Deserialize;

use crate::constants::{difficulty, mechanics};
use crate::error::ConfigError;

/// The current difficulty of a session.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DifficultyParameters {
    /// Seconds between traffic car spawns.
    pub car_spawn_interval: f32,
    /// Seconds between fuel pickup spawns.
    pub fuel_spawn_interval: f32,
    /// Seconds a falling entity takes to cross the playfield.
    pub fall_duration: f32,
    /// Fuel burned per second.
    pub fuel_consumption: f32,
    /// Number of escalations applied so far.
    #[serde(skip)]
    pub level: u32,
}

impl Default for DifficultyParameters {
    fn default() -> Self {
        Self {
            car_spawn_interval: difficulty::CAR_SPAWN_INTERVAL,
            fuel_spawn_interval: difficulty::FUEL_SPAWN_INTERVAL,
            fall_duration: difficulty::FALL_DURATION,
            fuel_consumption: difficulty::FUEL_CONSUMPTION,
            level: 0,
        }
    }
}

impl DifficultyParameters {
    /// Applies one escalation step.
    ///
    /// Intervals and the fall duration shrink but never drop below
    /// [`difficulty::MIN_DURATION`]; consumption only grows.
    pub fn escalate(&mut self, step: &EscalationStep) {
        let shrink = |value: f32, delta: f32| (value - delta).max(difficulty::MIN_DURATION);

        self.car_spawn_interval = shrink(self.car_spawn_interval, step.car_spawn_interval);
        self.fuel_spawn_interval = shrink(self.fuel_spawn_interval, step.fuel_spawn_interval);
        self.fall_duration = shrink(self.fall_duration, step.fall_duration);
        self.fuel_consumption += step.fuel_consumption;
        self.level += 1;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("car_spawn_interval", self.car_spawn_interval)?;
        positive("fuel_spawn_interval", self.fuel_spawn_interval)?;
        positive("fall_duration", self.fall_duration)?;
        positive("fuel_consumption", self.fuel_consumption)
    }
}

/// The deltas applied on every escalation.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EscalationStep {
    pub car_spawn_interval: f32,
    pub fuel_spawn_interval: f32,
    pub fall_duration: f32,
    pub fuel_consumption: f32,
}

impl Default for EscalationStep {
    fn default() -> Self {
        Self {
            car_spawn_interval: difficulty::CAR_SPAWN_INTERVAL_STEP,
            fuel_spawn_interval: difficulty::FUEL_SPAWN_INTERVAL_STEP,
            fall_duration: difficulty::FALL_DURATION_STEP,
            fuel_consumption: difficulty::FUEL_CONSUMPTION_STEP,
        }
    }
}

impl EscalationStep {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("escalation.car_spawn_interval", self.car_spawn_interval)?;
        non_negative("escalation.fuel_spawn_interval", self.fuel_spawn_interval)?;
        non_negative("escalation.fall_duration", self.fall_duration)?;
        non_negative("escalation.fuel_consumption", self.fuel_consumption)
    }
}

/// Counts the score boundaries crossed when the score moves from `old` to `new`.
///
/// Landing exactly on a boundary counts as crossing it; moving downward crosses nothing.
pub fn boundaries_crossed(old: f64, new: f64) -> u32 {
    let step = mechanics::ESCALATION_SCORE_STEP;
    let before = (old / step).floor();
    let after = (new / step).floor();
    if after > before {
        (after - before) as u32
    } else {
        0
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}
