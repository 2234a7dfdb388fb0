//! Repeating spawn tasks and the systems that act on them.
//!
//! Every task runs on game time: while the scene is paused nothing here is scheduled, so
//! timers freeze instead of firing in a burst on resume.

use bevy_ecs::{
    event::{EventReader, EventWriter},
    resource::Resource,
    system::{Commands, Res, ResMut},
    world::World,
};
use glam::Vec2;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{debug, trace};

use crate::constants::{layout, mechanics, timing};
use crate::events::{DifficultyChanged, ScheduledTask};
use crate::systems::components::{Aabb, CoinKind, DeltaTime, Fall, Size};
use crate::systems::difficulty::DifficultyParameters;
use crate::systems::factory::{Blueprint, CarCatalog, EntityFactory};
use crate::systems::session::{ScoreKeeper, SessionContext};

/// A timer that fires every `period` seconds once its initial delay has passed.
///
/// Like a `wait` followed by a `run`, the first firing happens one full period after arming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatingTask {
    period: f32,
    elapsed: f32,
    delay: f32,
    armed: bool,
}

impl RepeatingTask {
    pub fn new(period: f32) -> Self {
        Self::with_delay(period, 0.0)
    }

    pub fn with_delay(period: f32, delay: f32) -> Self {
        Self {
            period,
            elapsed: 0.0,
            delay,
            armed: true,
        }
    }

    pub fn disarmed() -> Self {
        Self {
            period: 0.0,
            elapsed: 0.0,
            delay: 0.0,
            armed: false,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Advances the timer and returns how many times it fired.
    pub fn tick(&mut self, seconds: f32) -> u32 {
        if !self.armed || self.period <= 0.0 {
            return 0;
        }

        let mut seconds = seconds;
        if self.delay > 0.0 {
            if seconds < self.delay {
                self.delay -= seconds;
                return 0;
            }
            seconds -= self.delay;
            self.delay = 0.0;
        }

        self.elapsed += seconds;
        let fired = (self.elapsed / self.period).floor();
        self.elapsed -= fired * self.period;
        fired as u32
    }

    /// Restarts the timer with a new period. A pending initial delay is kept.
    pub fn rearm(&mut self, period: f32) {
        self.period = period;
        self.elapsed = 0.0;
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.elapsed = 0.0;
        self.delay = 0.0;
    }
}

/// The session's repeating tasks.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SpawnSchedule {
    pub coin: RepeatingTask,
    pub fuel: RepeatingTask,
    pub car: RepeatingTask,
    pub road_line: RepeatingTask,
    pub fuel_burn: RepeatingTask,
}

impl Default for SpawnSchedule {
    fn default() -> Self {
        Self {
            coin: RepeatingTask::disarmed(),
            fuel: RepeatingTask::disarmed(),
            car: RepeatingTask::disarmed(),
            road_line: RepeatingTask::disarmed(),
            fuel_burn: RepeatingTask::disarmed(),
        }
    }
}

impl SpawnSchedule {
    /// Arms every task for a fresh session. Wide devices get static road lines instead
    /// of scrolling ones.
    pub fn arm(&mut self, difficulty: &DifficultyParameters, wide: bool) {
        self.coin = RepeatingTask::new(timing::COIN_SPAWN_PERIOD);
        self.fuel = RepeatingTask::new(difficulty.fuel_spawn_interval);
        self.car = RepeatingTask::with_delay(difficulty.car_spawn_interval, timing::CAR_START_DELAY);
        self.road_line = if wide {
            RepeatingTask::disarmed()
        } else {
            RepeatingTask::new(timing::ROAD_LINE_PERIOD)
        };
        self.fuel_burn = RepeatingTask::new(timing::FUEL_BURN_PERIOD);
    }

    pub fn cancel_all(&mut self) {
        for task in self.tasks_mut() {
            task.cancel();
        }
    }

    fn tasks_mut(&mut self) -> [&mut RepeatingTask; 5] {
        [
            &mut self.coin,
            &mut self.fuel,
            &mut self.car,
            &mut self.road_line,
            &mut self.fuel_burn,
        ]
    }
}

/// Randomness for spawn positions, coin kinds and car models.
#[derive(Resource, Debug, Clone)]
pub struct SceneRng(pub SmallRng);

impl SceneRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_os_rng()),
        }
    }

    /// A whole-point x coordinate at least [`mechanics::SPAWN_MARGIN`] away from both edges.
    pub fn spawn_x(&mut self, width: f32) -> f32 {
        let low = mechanics::SPAWN_MARGIN as i32;
        let high = ((width - mechanics::SPAWN_MARGIN) as i32).max(low);
        self.0.random_range(low..=high) as f32
    }

    pub fn coin_kind(&mut self) -> CoinKind {
        CoinKind::from_roll(self.0.random_range(0..=10))
    }
}

/// Turns elapsed game time into [`ScheduledTask`] events.
pub fn task_clock_system(
    dt: Res<DeltaTime>,
    mut schedule: ResMut<SpawnSchedule>,
    mut tasks: EventWriter<ScheduledTask>,
) {
    let seconds = dt.seconds;
    let fired = [
        (ScheduledTask::AddCoin, schedule.coin.tick(seconds)),
        (ScheduledTask::AddFuel, schedule.fuel.tick(seconds)),
        (ScheduledTask::AddCar, schedule.car.tick(seconds)),
        (ScheduledTask::AddRoadLine, schedule.road_line.tick(seconds)),
        (ScheduledTask::BurnFuel, schedule.fuel_burn.tick(seconds)),
    ];

    for (task, count) in fired {
        for _ in 0..count {
            tasks.write(task);
        }
    }
}

/// Restarts the car and fuel timers whenever the difficulty escalates.
pub fn rearm_on_difficulty_system(
    mut changes: EventReader<DifficultyChanged>,
    difficulty: Res<DifficultyParameters>,
    mut schedule: ResMut<SpawnSchedule>,
) {
    let Some(change) = changes.read().last() else {
        return;
    };

    debug!(
        level = change.level,
        car_interval = difficulty.car_spawn_interval,
        fuel_interval = difficulty.fuel_spawn_interval,
        "Re-arming spawn tasks"
    );
    schedule.car.rearm(difficulty.car_spawn_interval);
    schedule.fuel.rearm(difficulty.fuel_spawn_interval);
}

pub fn spawn_system(
    mut commands: Commands,
    mut tasks: EventReader<ScheduledTask>,
    mut rng: ResMut<SceneRng>,
    factory: Res<EntityFactory>,
    catalog: Res<CarCatalog>,
    context: Res<SessionContext>,
    difficulty: Res<DifficultyParameters>,
) {
    for task in tasks.read() {
        match task {
            ScheduledTask::AddCoin => {
                let kind = rng.coin_kind();
                spawn_pickup(&mut commands, &mut rng, &factory, Blueprint::Coin(kind), difficulty.fall_duration);
            }
            ScheduledTask::AddFuel => {
                spawn_pickup(&mut commands, &mut rng, &factory, Blueprint::Fuel, difficulty.fall_duration);
            }
            ScheduledTask::AddCar => spawn_cars(
                &mut commands,
                &mut rng,
                &factory,
                &catalog,
                context.enforce_collision_shapes,
                difficulty.fall_duration,
            ),
            ScheduledTask::AddRoadLine => spawn_road_lines(&mut commands, &factory),
            ScheduledTask::BurnFuel => {}
        }
    }
}

pub fn fuel_burn_system(mut tasks: EventReader<ScheduledTask>, mut keeper: ScoreKeeper) {
    for task in tasks.read() {
        if *task == ScheduledTask::BurnFuel {
            keeper.burn_fuel();
        }
    }
}

fn fall_for(start_y: f32, size: Vec2, duration: f32) -> Fall {
    Fall::new(start_y, -size.y / 2.0, duration)
}

fn spawn_pickup(
    commands: &mut Commands,
    rng: &mut SceneRng,
    factory: &EntityFactory,
    blueprint: Blueprint,
    fall_duration: f32,
) {
    let built = factory.create(blueprint);
    let start = Vec2::new(rng.spawn_x(factory.playfield.x), built.position().y);
    let fall = fall_for(start.y, built.size(), fall_duration);

    trace!(?blueprint, x = start.x, "Spawning pickup");
    built.at(start).spawn(commands, fall);
}

fn spawn_cars(
    commands: &mut Commands,
    rng: &mut SceneRng,
    factory: &EntityFactory,
    catalog: &CarCatalog,
    enforce_collision_shapes: bool,
    fall_duration: f32,
) {
    let attempts = if factory.device.is_wide() { 2 } else { 1 };
    let mut previous: Option<Aabb> = None;

    for _ in 0..attempts {
        let car = catalog.choose(&mut rng.0);
        if !car.has_body && enforce_collision_shapes {
            trace!(index = car.index, "Skipping car without a collision shape");
            continue;
        }

        let built = factory.create(Blueprint::TrafficCar(car));
        let start = Vec2::new(rng.spawn_x(factory.playfield.x), built.position().y);

        if factory.device.is_wide() {
            let frame = Aabb::from_center(start, built.size());
            if previous.is_some_and(|other| other.intersects(&frame)) {
                trace!(index = car.index, x = start.x, "Second car would overlap, skipping");
                continue;
            }
            previous = Some(frame);
        }

        let fall = fall_for(start.y, built.size(), fall_duration);
        trace!(index = car.index, x = start.x, "Spawning traffic car");
        built.at(start).spawn(commands, fall);
    }
}

/// X coordinates of the lane separators: `k * width / scale` for `k` in `1..scale`.
pub fn road_line_xs(factory: &EntityFactory) -> impl Iterator<Item = f32> {
    let width = factory.playfield.x;
    let scale = factory.device.scale_ratio();
    (1..scale as u32).map(move |k| k as f32 * width / scale)
}

fn spawn_road_lines(commands: &mut Commands, factory: &EntityFactory) {
    let travel = layout::ROAD_LINE_SIZE.y + layout::ROAD_LINE_CLEARANCE;
    let start_y = factory.playfield.y + travel;

    for x in road_line_xs(factory) {
        let fall = Fall::new(start_y, -travel, timing::ROAD_LINE_FALL_DURATION);
        factory
            .create(Blueprint::RoadLine)
            .at(Vec2::new(x, start_y))
            .spawn(commands, fall);
    }
}

/// Lays out the tall, motionless lane separators used on wide-aspect devices.
pub fn spawn_static_road_lines(world: &mut World) {
    let Some(factory) = world.get_resource::<EntityFactory>().copied() else {
        return;
    };

    let height = factory.playfield.y * 2.0;
    for x in road_line_xs(&factory) {
        let mut built = factory.create(Blueprint::RoadLine).at(Vec2::new(x, factory.playfield.y));
        built.bundle.size = Size(Vec2::new(layout::ROAD_LINE_SIZE.x, height));
        built.spawn_in(world, ());
    }
    debug!(device = %factory.device, "Static road lines placed");
}

