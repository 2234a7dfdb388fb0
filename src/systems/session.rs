//! Per-session gameplay state and the single place it is mutated from.

use bevy_ecs::{
    event::EventWriter,
    resource::Resource,
    system::{Res, ResMut, SystemParam},
};
use tracing::{debug, info, trace};

use crate::constants::mechanics;
use crate::events::{DifficultyChanged, GameOverTriggered, SceneNotification};
use crate::systems::difficulty::{boundaries_crossed, DifficultyParameters, EscalationStep};
use crate::systems::factory::CarDescriptor;
use crate::systems::state::GameOverReason;

/// Points accumulated in the current session.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct Score(pub f64);

/// Remaining fuel, in `0..=100`.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Fuel(pub f32);

impl Default for Fuel {
    fn default() -> Self {
        Self(mechanics::MAX_FUEL)
    }
}

/// A resource to store the number of player lives.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerLives(pub u8);

impl Default for PlayerLives {
    fn default() -> Self {
        Self(mechanics::STARTING_LIVES)
    }
}

/// Set once the session has ended, cleared by a revive.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameOver(pub bool);

/// Session-scoped settings resolved when the scene is built.
#[derive(Resource, Debug, Clone)]
pub struct SessionContext {
    /// The car the player drives.
    pub player_car: CarDescriptor,
    /// Difficulty a fresh session starts from.
    pub baseline: DifficultyParameters,
    pub fuel_pickup_refill: f32,
    pub enforce_collision_shapes: bool,
    /// Number of sessions started by this scene.
    pub sessions: u32,
}

/// Every write to score, fuel and lives goes through here, so escalation, game-over
/// detection and observer notifications can never be skipped.
#[derive(SystemParam)]
pub struct ScoreKeeper<'w> {
    score: ResMut<'w, Score>,
    fuel: ResMut<'w, Fuel>,
    lives: ResMut<'w, PlayerLives>,
    game_over: ResMut<'w, GameOver>,
    difficulty: ResMut<'w, DifficultyParameters>,
    step: Res<'w, EscalationStep>,
    difficulty_changed: EventWriter<'w, DifficultyChanged>,
    game_over_triggered: EventWriter<'w, GameOverTriggered>,
    notifications: EventWriter<'w, SceneNotification>,
}

impl ScoreKeeper<'_> {
    pub fn score(&self) -> f64 {
        self.score.0
    }

    pub fn fuel(&self) -> f32 {
        self.fuel.0
    }

    pub fn lives(&self) -> u8 {
        self.lives.0
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.0
    }

    pub fn difficulty(&self) -> &DifficultyParameters {
        &self.difficulty
    }

    pub fn notify(&mut self, notification: SceneNotification) {
        self.notifications.write(notification);
    }

    pub fn add_score(&mut self, amount: f64) {
        let total = self.score.0 + amount;
        self.set_score(total);
    }

    /// Stores a new score, escalating the difficulty once for every multiple of 100 crossed.
    pub fn set_score(&mut self, score: f64) {
        let score = score.max(0.0);
        let crossed = boundaries_crossed(self.score.0, score);

        for _ in 0..crossed {
            self.difficulty.escalate(&self.step);
            debug!(
                level = self.difficulty.level,
                car_interval = self.difficulty.car_spawn_interval,
                fall_duration = self.difficulty.fall_duration,
                "Difficulty escalated"
            );
            self.difficulty_changed.write(DifficultyChanged {
                level: self.difficulty.level,
            });
        }

        self.score.0 = score;
        self.notifications.write(SceneNotification::ScoreUpdated(score));
    }

    /// Stores a new fuel level, clamped to the tank. An empty tank ends the session.
    pub fn set_fuel(&mut self, fuel: f32) {
        let fuel = fuel.clamp(0.0, mechanics::MAX_FUEL);
        self.fuel.0 = fuel;
        self.notifications.write(SceneNotification::FuelUpdated(fuel));

        if fuel <= 0.0 {
            self.finish(GameOverReason::RunningOutOfFuel);
        }
    }

    /// Burns one period's worth of fuel. Does nothing once the session is over.
    pub fn burn_fuel(&mut self) {
        if self.game_over.0 {
            return;
        }

        let remaining = (self.fuel.0 - self.difficulty.fuel_consumption).max(0.0);
        trace!(remaining, "Fuel burned");
        self.set_fuel(remaining);
    }

    /// Observers hear about the new count before it is stored. Zero lives ends the session.
    pub fn set_lives(&mut self, lives: u8) {
        self.notifications.write(SceneNotification::LifeCountWillUpdate(lives));
        self.lives.0 = lives;

        if lives == 0 {
            self.finish(GameOverReason::Crash);
        }
    }

    pub fn lose_life(&mut self) {
        let remaining = self.lives.0.saturating_sub(1);
        debug!(remaining, "Player lost a life");
        self.set_lives(remaining);
    }

    /// Ends the session. Returns false if it had already ended.
    pub fn finish(&mut self, reason: GameOverReason) -> bool {
        if self.game_over.0 {
            return false;
        }

        self.game_over.0 = true;
        info!(?reason, score = self.score.0, "Game over");
        self.game_over_triggered.write(GameOverTriggered(reason));
        true
    }

    /// Restores a playable session after a reward: at least one life and a full tank.
    pub fn revive(&mut self) {
        self.game_over.0 = false;
        let lives = self.lives.0.max(1);
        self.set_lives(lives);
        self.set_fuel(mechanics::MAX_FUEL);
    }
}
