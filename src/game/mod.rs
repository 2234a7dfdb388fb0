//! This module contains the scene controller that owns the game world.

use std::rc::{Rc, Weak};
use std::sync::mpsc::{self, Receiver, Sender};

use bevy_ecs::event::{Event, EventRegistry, Events};
use bevy_ecs::query::With;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::world::World;
use glam::Vec2;
use tracing::{debug, info, trace, warn};

use crate::config::SceneConfig;
use crate::error::{GameError, GameResult};
use crate::events::{DifficultyChanged, GameCommand, GameEvent, GameOverTriggered, ScheduledTask, SceneNotification};
use crate::formatter;
use crate::systems::collision::{contact_detection_system, contact_resolution_system, ContactMemory};
use crate::systems::components::{DeltaTime, EntityKind, PlayerControlled, Position, RoadBounds};
use crate::systems::difficulty::DifficultyParameters;
use crate::systems::factory::{Blueprint, CarCatalog, EntityFactory};
use crate::systems::input::{motion_system, ChannelMotionSource, MotionInput, MotionSampler, MotionSource};
use crate::systems::lifetime::time_to_live_system;
use crate::systems::movement::fall_system;
use crate::systems::session::{Fuel, GameOver, PlayerLives, Score, SessionContext};
use crate::systems::spawner::{
    fuel_burn_system, rearm_on_difficulty_system, spawn_static_road_lines, spawn_system, task_clock_system, SceneRng,
    SpawnSchedule,
};
use crate::systems::state::{
    command_system, gameplay_active, record_game_over_system, stage_system, traffic_clear_system, GameStage, GotReward,
    PauseState, PendingGameOver, SceneState, TrafficClear,
};

mod delegate;

pub use delegate::SceneDelegate;

/// System sets, in the order they run each tick.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Inbound commands; always runs, even while paused.
    Commands,
    /// Tilt input.
    Input,
    /// Spawn timers and the entities they produce.
    Spawn,
    /// Motion and contact detection.
    Update,
    /// Contact resolution and game-over handling.
    Respond,
}

/// A cloneable, `Send` handle for talking to a scene from other threads.
///
/// Commands are queued and applied at the start of the scene's next tick. Sends to a
/// dropped scene are discarded.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    sender: Sender<GameCommand>,
}

impl SceneHandle {
    pub fn send(&self, command: GameCommand) {
        if self.sender.send(command).is_err() {
            trace!(?command, "Scene is gone, dropping command");
        }
    }

    pub fn set_paused(&self, paused: bool) {
        self.send(GameCommand::SetPaused(paused));
    }

    /// The application is resigning active: keep the current pause through the next request.
    pub fn will_resign_active(&self) {
        self.send(GameCommand::StayPaused);
    }

    pub fn did_get_reward(&self) {
        self.send(GameCommand::Revive);
    }

    pub fn will_present_reward_ad(&self) {
        self.send(GameCommand::PresentRewardAd);
    }
}

/// The gameplay core of one scene.
///
/// Owns the `World` holding every entity and session resource, and the `Schedule` that
/// advances them. Only the thread that owns the scene ever touches the world; everyone
/// else goes through a [`SceneHandle`] or a motion channel.
pub struct GameScene {
    world: World,
    schedule: Schedule,
    commands: Receiver<GameCommand>,
    handle: SceneHandle,
    delegate: Option<Weak<dyn SceneDelegate>>,
    tick: u64,
}

impl GameScene {
    /// Builds a scene with the default car catalog.
    pub fn new(config: SceneConfig) -> GameResult<Self> {
        Self::with_catalog(config, CarCatalog::default())
    }

    pub fn with_catalog(config: SceneConfig, catalog: CarCatalog) -> GameResult<Self> {
        config.validate()?;

        let mut world = World::default();
        let mut schedule = Schedule::default();

        Self::setup_ecs(&mut world);
        Self::insert_resources(&mut world, &config, catalog);
        Self::configure_schedule(&mut schedule);

        let (sender, commands) = mpsc::channel();
        info!(
            width = config.width,
            height = config.height,
            device = %config.device,
            player_car = config.player_car,
            "Scene created"
        );

        Ok(Self {
            world,
            schedule,
            commands,
            handle: SceneHandle { sender },
            delegate: None,
            tick: 0,
        })
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameError>(world);
        EventRegistry::register_event::<GameEvent>(world);
        EventRegistry::register_event::<ScheduledTask>(world);
        EventRegistry::register_event::<DifficultyChanged>(world);
        EventRegistry::register_event::<GameOverTriggered>(world);
        EventRegistry::register_event::<SceneNotification>(world);
    }

    fn insert_resources(world: &mut World, config: &SceneConfig, catalog: CarCatalog) {
        let player_car = catalog.player_car(config.player_car);

        world.insert_resource(EntityFactory::new(config.playfield(), config.device));
        world.insert_resource(catalog);
        world.insert_resource(SessionContext {
            player_car,
            baseline: config.difficulty,
            fuel_pickup_refill: config.fuel_pickup_refill,
            enforce_collision_shapes: config.enforce_collision_shapes,
            sessions: 0,
        });
        world.insert_resource(config.difficulty);
        world.insert_resource(config.escalation);
        world.insert_resource(SceneRng::new(config.seed));
        world.insert_resource(DeltaTime::from_seconds(0.0));
        world.insert_non_send_resource(MotionInput::default());

        Self::insert_session_state(world);
    }

    /// Resources that start fresh with every session.
    fn insert_session_state(world: &mut World) {
        world.insert_resource(Score::default());
        world.insert_resource(Fuel::default());
        world.insert_resource(PlayerLives::default());
        world.insert_resource(GameOver::default());
        world.insert_resource(PauseState::default());
        world.insert_resource(SceneState::default());
        world.insert_resource(GotReward::default());
        world.insert_resource(GameStage::default());
        world.insert_resource(PendingGameOver::default());
        world.insert_resource(TrafficClear::default());
        world.insert_resource(SpawnSchedule::default());
        world.insert_resource(MotionSampler::default());
        world.insert_resource(ContactMemory::default());
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule
            .add_systems((
                command_system.in_set(GameplaySet::Commands),
                traffic_clear_system.after(GameplaySet::Commands),
                motion_system.in_set(GameplaySet::Input),
                (task_clock_system, spawn_system, fuel_burn_system)
                    .chain()
                    .in_set(GameplaySet::Spawn),
                (fall_system, time_to_live_system, contact_detection_system)
                    .chain()
                    .in_set(GameplaySet::Update),
                (
                    contact_resolution_system,
                    rearm_on_difficulty_system,
                    record_game_over_system,
                    stage_system,
                )
                    .chain()
                    .in_set(GameplaySet::Respond),
            ))
            .configure_sets(
                (
                    GameplaySet::Commands,
                    GameplaySet::Input.run_if(gameplay_active),
                    GameplaySet::Spawn.run_if(gameplay_active),
                    GameplaySet::Update.run_if(gameplay_active),
                    GameplaySet::Respond.run_if(gameplay_active),
                )
                    .chain(),
            );
    }

    /// Starts a session: places the player, arms every spawn task and lays out the road.
    pub fn start(&mut self) -> GameResult<()> {
        if self.state() != SceneState::Loading {
            return Err(GameError::InvalidState(format!(
                "Cannot start a scene that is already {}",
                self.state()
            )));
        }

        let factory = *self.world.resource::<EntityFactory>();
        let sessions = {
            let mut context = self.world.resource_mut::<SessionContext>();
            context.sessions += 1;
            context.sessions
        };
        let player_car = self.world.resource::<SessionContext>().player_car;

        let player = factory.create(Blueprint::Player(player_car));
        let bounds = RoadBounds::new(factory.playfield, player.size());
        let start = bounds.start_position(factory.playfield);
        self.world.insert_resource(bounds);
        player.at(start).spawn_in(&mut self.world, ());

        let difficulty = *self.world.resource::<DifficultyParameters>();
        self.world
            .resource_mut::<SpawnSchedule>()
            .arm(&difficulty, factory.device.is_wide());
        if factory.device.is_wide() {
            spawn_static_road_lines(&mut self.world);
        }

        self.world.resource_mut::<MotionSampler>().start();
        *self.world.resource_mut::<SceneState>() = SceneState::Running;
        self.world
            .resource_mut::<Events<SceneNotification>>()
            .send(SceneNotification::StateUpdated(SceneState::Running));

        info!(session = sessions, car = player_car.index, ?bounds, "Session started");
        self.dispatch_notifications();
        Ok(())
    }

    /// Tears the session down: cancels every task, removes every entity and restores the
    /// starting state. The scene can be started again afterwards.
    pub fn reset(&mut self) {
        self.world.resource_mut::<SpawnSchedule>().cancel_all();
        self.world.clear_entities();
        self.world.remove_resource::<RoadBounds>();

        let baseline = self.world.resource::<SessionContext>().baseline;
        self.world.insert_resource(baseline);
        Self::insert_session_state(&mut self.world);
        self.world.resource_mut::<MotionSampler>().stop();

        clear_events::<GameEvent>(&mut self.world);
        clear_events::<ScheduledTask>(&mut self.world);
        clear_events::<DifficultyChanged>(&mut self.world);
        clear_events::<GameOverTriggered>(&mut self.world);
        clear_events::<SceneNotification>(&mut self.world);
        clear_events::<GameError>(&mut self.world);
        while self.commands.try_recv().is_ok() {}

        debug!("Scene reset");
    }

    /// Advances the scene by `dt` seconds. A negative or non-finite `dt` counts as zero.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.max(0.0)
        } else {
            warn!(dt, "Ignoring non-finite frame time");
            0.0
        };
        self.tick += 1;
        formatter::set_tick_count(self.tick);
        self.world.insert_resource(DeltaTime::from_seconds(dt));

        while let Ok(command) = self.commands.try_recv() {
            self.world
                .resource_mut::<Events<GameEvent>>()
                .send(GameEvent::Command(command));
        }

        self.schedule.run(&mut self.world);

        self.world.resource_mut::<Events<GameEvent>>().update();
        self.world.resource_mut::<Events<ScheduledTask>>().update();
        self.world.resource_mut::<Events<DifficultyChanged>>().update();
        self.world.resource_mut::<Events<GameOverTriggered>>().update();

        let errors: Vec<GameError> = self.world.resource_mut::<Events<GameError>>().drain().collect();
        for error in errors {
            warn!(%error, "System reported an error");
        }

        self.dispatch_notifications();
    }

    fn dispatch_notifications(&mut self) {
        let notifications: Vec<SceneNotification> =
            self.world.resource_mut::<Events<SceneNotification>>().drain().collect();

        let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) else {
            return;
        };

        for notification in notifications {
            match notification {
                SceneNotification::ScoreUpdated(score) => delegate.did_update_score(score),
                SceneNotification::LifeCountWillUpdate(count) => delegate.will_update_life_count(count),
                SceneNotification::FuelUpdated(fuel) => delegate.did_update_remaining_fuel(fuel),
                SceneNotification::GameFinished(score) => delegate.did_finish_game(score),
                SceneNotification::StateUpdated(state) => delegate.did_update_game_state(state),
            }
        }
    }

    /// Registers the observer for scene notifications. Only a weak reference is kept.
    pub fn set_delegate<D: SceneDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let weak: Weak<D> = Rc::downgrade(delegate);
        self.delegate = Some(weak);
    }

    pub fn handle(&self) -> SceneHandle {
        self.handle.clone()
    }

    /// Installs a channel-backed motion source and returns its sending half.
    pub fn motion_channel(&mut self) -> Sender<Vec2> {
        let (sender, receiver) = mpsc::channel();
        self.set_motion_source(ChannelMotionSource::new(receiver));
        sender
    }

    pub fn set_motion_source(&mut self, source: impl MotionSource + 'static) {
        self.world.insert_non_send_resource(MotionInput(Box::new(source)));
    }

    pub fn set_paused(&self, paused: bool) {
        self.handle.set_paused(paused);
    }

    pub fn will_resign_active(&self) {
        self.handle.will_resign_active();
    }

    pub fn did_get_reward(&self) {
        self.handle.did_get_reward();
    }

    pub fn will_present_reward_ad(&self) {
        self.handle.will_present_reward_ad();
    }

    pub fn score(&self) -> f64 {
        self.world.resource::<Score>().0
    }

    pub fn fuel(&self) -> f32 {
        self.world.resource::<Fuel>().0
    }

    pub fn lives(&self) -> u8 {
        self.world.resource::<PlayerLives>().0
    }

    pub fn state(&self) -> SceneState {
        *self.world.resource::<SceneState>()
    }

    pub fn is_paused(&self) -> bool {
        self.world.resource::<PauseState>().is_paused()
    }

    pub fn is_game_over(&self) -> bool {
        self.world.resource::<GameOver>().0
    }

    pub fn difficulty(&self) -> DifficultyParameters {
        *self.world.resource::<DifficultyParameters>()
    }

    pub fn road_bounds(&self) -> Option<RoadBounds> {
        self.world.get_resource::<RoadBounds>().copied()
    }

    pub fn sessions(&self) -> u32 {
        self.world.resource::<SessionContext>().sessions
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn player_position(&mut self) -> Option<Vec2> {
        let mut query = self.world.query_filtered::<&Position, With<PlayerControlled>>();
        query.iter(&self.world).next().map(|position| position.0)
    }

    /// Counts live entities matching a predicate on their kind.
    pub fn count_entities(&mut self, predicate: impl Fn(&EntityKind) -> bool) -> usize {
        let mut query = self.world.query::<&EntityKind>();
        query.iter(&self.world).filter(|kind| predicate(kind)).count()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

fn clear_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.clear();
    }
}
