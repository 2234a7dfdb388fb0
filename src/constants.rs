//! This module contains all the constants used in the game.

use std::time::Duration;

use glam::Vec2;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// Default playfield size, in points (a portrait phone screen).
pub const DEFAULT_PLAYFIELD: Vec2 = Vec2::new(375.0, 812.0);

/// Repeating task periods and one-shot delays, in seconds.
pub mod timing {
    /// A coin is dropped on the road this often, regardless of difficulty.
    pub const COIN_SPAWN_PERIOD: f32 = 5.0;
    /// The car task is armed this long after the session starts.
    pub const CAR_START_DELAY: f32 = 0.5;
    /// Scrolling road lines are emitted this often (narrow devices only).
    pub const ROAD_LINE_PERIOD: f32 = 0.05;
    /// Time for a scrolling road line to cross the playfield.
    pub const ROAD_LINE_FALL_DURATION: f32 = 0.5;
    /// Fuel is burned once per period.
    pub const FUEL_BURN_PERIOD: f32 = 1.0;
    /// Accelerometer sampling period (100 Hz).
    pub const MOTION_SAMPLE_PERIOD: f32 = 0.01;
    /// Delay between a fatal crash and the post-game routing.
    pub const CRASH_SEQUENCE_DURATION: f32 = 1.0;
    /// Delay between presenting a reward ad and clearing the road of traffic.
    pub const TRAFFIC_CLEAR_DELAY: f32 = 1.0;
}

/// Core gameplay numbers.
pub mod mechanics {
    pub const MAX_FUEL: f32 = 100.0;
    pub const STARTING_LIVES: u8 = 3;
    /// Multiplier from accelerometer reading to points moved per sample.
    pub const TILT_GAIN: f32 = 10.0;
    /// Horizontal margin kept free of spawns on both road edges.
    pub const SPAWN_MARGIN: f32 = 30.0;
    /// Extra clearance between the player and the bottom edge.
    pub const ROAD_BOTTOM_PADDING: f32 = 10.0;
    /// Difficulty escalates every time the score crosses a multiple of this.
    pub const ESCALATION_SCORE_STEP: f64 = 100.0;
    /// Score awarded when a traffic car leaves the road without hitting the player.
    pub const CAR_PASS_SCORE: f64 = 1.0;
}

/// Starting difficulty and the per-escalation deltas.
pub mod difficulty {
    pub const CAR_SPAWN_INTERVAL: f32 = 1.5;
    pub const FUEL_SPAWN_INTERVAL: f32 = 12.0;
    pub const FALL_DURATION: f32 = 4.0;
    pub const FUEL_CONSUMPTION: f32 = 1.0;

    pub const CAR_SPAWN_INTERVAL_STEP: f32 = 0.1;
    pub const FUEL_SPAWN_INTERVAL_STEP: f32 = 0.5;
    pub const FALL_DURATION_STEP: f32 = 0.2;
    pub const FUEL_CONSUMPTION_STEP: f32 = 0.1;

    /// Floor that keeps every interval and duration positive.
    pub const MIN_DURATION: f32 = 0.1;
}

/// Sizes and z-ordering.
pub mod layout {
    use glam::Vec2;

    /// Number of lanes (and road-line scale) on narrow devices.
    pub const PHONE_SCALE_RATIO: f32 = 4.0;
    /// Number of lanes (and road-line scale) on wide-aspect devices.
    pub const TABLET_SCALE_RATIO: f32 = 6.0;

    /// Pickup diameter as a fraction of the playfield width.
    pub const PHONE_PICKUP_DIVISOR: f32 = 12.0;
    pub const TABLET_PICKUP_DIVISOR: f32 = 24.0;

    pub const ROAD_LINE_SIZE: Vec2 = Vec2::new(6.0, 30.0);
    /// Vertical clearance added above and below a scrolling road line.
    pub const ROAD_LINE_CLEARANCE: f32 = 20.0;

    /// Catalog index of the truck, which is drawn wider than the other cars.
    pub const TRUCK_INDEX: u8 = 20;
    pub const CAR_ASPECT: f32 = 2.0;
    pub const TRUCK_ASPECT: f32 = 3.2;
    pub const CATALOG_SIZE: u8 = 21;
}

/// Z-order of each entity family.
pub mod layer {
    pub const ROAD: i8 = -1;
    pub const PICKUP: i8 = 0;
    pub const TRAFFIC: i8 = 0;
    pub const PLAYER: i8 = 1;
    pub const EFFECT: i8 = 2;
}
