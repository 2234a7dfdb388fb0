//! Tilt input: accelerometer samples nudge the player around the road.

use std::sync::mpsc::{Receiver, TryRecvError};

use bevy_ecs::{
    event::EventWriter,
    query::With,
    resource::Resource,
    system::{NonSendMut, Query, Res, ResMut},
};
use glam::Vec2;
use tracing::trace;

use crate::constants::{mechanics, timing};
use crate::error::GameError;
use crate::systems::components::{DeltaTime, PlayerControlled, Position, RoadBounds};

/// Anything that can report the current device acceleration.
pub trait MotionSource {
    /// Returns the latest acceleration reading, or `None` if nothing new arrived.
    fn sample(&mut self) -> Option<Vec2>;
}

/// Receives samples produced on another thread (the platform's sensor callback).
pub struct ChannelMotionSource {
    receiver: Receiver<Vec2>,
    disconnected: bool,
}

impl ChannelMotionSource {
    pub fn new(receiver: Receiver<Vec2>) -> Self {
        Self {
            receiver,
            disconnected: false,
        }
    }
}

impl MotionSource for ChannelMotionSource {
    /// Drains everything pending and keeps only the newest reading.
    fn sample(&mut self) -> Option<Vec2> {
        if self.disconnected {
            return None;
        }

        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(acceleration) => latest = Some(acceleration),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    trace!("Motion channel disconnected");
                    self.disconnected = true;
                    break;
                }
            }
        }
        latest
    }
}

/// A source that never reports anything. Used until a real one is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMotion;

impl MotionSource for NoMotion {
    fn sample(&mut self) -> Option<Vec2> {
        None
    }
}

/// The installed motion source. Lives in the world as a non-send resource.
pub struct MotionInput(pub Box<dyn MotionSource>);

impl Default for MotionInput {
    fn default() -> Self {
        Self(Box::new(NoMotion))
    }
}

/// Fixed-rate clock for accelerometer sampling (100 Hz of game time).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MotionSampler {
    elapsed: f32,
    running: bool,
}

impl Default for MotionSampler {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            running: true,
        }
    }
}

impl MotionSampler {
    /// Restarts the clock from zero.
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances the clock and returns how many samples came due.
    pub fn tick(&mut self, seconds: f32) -> u32 {
        if !self.running {
            return 0;
        }

        self.elapsed += seconds;
        let due = (self.elapsed / timing::MOTION_SAMPLE_PERIOD).floor();
        self.elapsed -= due * timing::MOTION_SAMPLE_PERIOD;
        due as u32
    }
}

/// Applies one acceleration sample to a position and clamps the result to the road.
///
/// Non-finite samples are dropped so a bad reading can never leave the player off the road.
pub fn apply_tilt(position: Vec2, acceleration: Vec2, bounds: &RoadBounds) -> Vec2 {
    if !acceleration.is_finite() {
        return bounds.clamp(position);
    }
    bounds.clamp(position + acceleration * mechanics::TILT_GAIN)
}

pub fn motion_system(
    dt: Res<DeltaTime>,
    bounds: Option<Res<RoadBounds>>,
    mut sampler: ResMut<MotionSampler>,
    mut source: NonSendMut<MotionInput>,
    mut players: Query<&mut Position, With<PlayerControlled>>,
    mut errors: EventWriter<GameError>,
) {
    let due = sampler.tick(dt.seconds);
    if due == 0 {
        return;
    }

    // Only the newest reading matters; every due sample re-applies it.
    let Some(acceleration) = source.0.sample() else {
        return;
    };

    let Some(bounds) = bounds else {
        return;
    };

    let mut position = match players.single_mut() {
        Ok(position) => position,
        Err(bevy_ecs::query::QuerySingleError::NoEntities(_)) => return,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "Expected exactly one player-controlled entity, found multiple: {e}"
            )));
            return;
        }
    };

    let mut next = position.0;
    for _ in 0..due {
        next = apply_tilt(next, acceleration, &bounds);
    }
    position.0 = next;
}
