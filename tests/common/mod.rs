#![allow(dead_code)]

use std::cell::RefCell;

use bevy_ecs::{entity::Entity, event::Events, world::World};
use drive_fast::{
    config::{DeviceClass, SceneConfig},
    events::{DifficultyChanged, GameCommand, GameEvent, GameOverTriggered, ScheduledTask, SceneNotification},
    error::GameError,
    game::{GameScene, SceneDelegate},
    systems::{
        collision::ContactMemory,
        components::{CoinKind, DeltaTime, RoadBounds},
        difficulty::{DifficultyParameters, EscalationStep},
        factory::{Blueprint, CarCatalog, CarDescriptor, EntityFactory},
        input::{MotionInput, MotionSampler},
        session::{Fuel, GameOver, PlayerLives, Score, SessionContext},
        spawner::{SceneRng, SpawnSchedule},
        state::{GameStage, GotReward, PauseState, PendingGameOver, SceneState, TrafficClear},
    },
};
use glam::Vec2;

pub const TEST_SEED: u64 = 0x5EED;
pub const FRAME: f32 = 1.0 / 60.0;

/// A phone-sized configuration with a fixed seed.
pub fn test_config() -> SceneConfig {
    SceneConfig {
        seed: Some(TEST_SEED),
        enforce_collision_shapes: false,
        ..SceneConfig::default()
    }
}

pub fn tablet_config() -> SceneConfig {
    SceneConfig {
        width: 768.0,
        height: 1024.0,
        device: DeviceClass::Tablet,
        ..test_config()
    }
}

/// Creates a world with every resource and event the gameplay systems expect, as a
/// running session would have it (but without a schedule or any entities).
pub fn create_test_world() -> World {
    create_world_for(&test_config())
}

pub fn create_world_for(config: &SceneConfig) -> World {
    let mut world = World::new();
    let catalog = CarCatalog::default();
    let factory = EntityFactory::new(config.playfield(), config.device);
    let player_car = catalog.player_car(config.player_car);

    world.insert_resource(Events::<GameEvent>::default());
    world.insert_resource(Events::<GameError>::default());
    world.insert_resource(Events::<ScheduledTask>::default());
    world.insert_resource(Events::<DifficultyChanged>::default());
    world.insert_resource(Events::<GameOverTriggered>::default());
    world.insert_resource(Events::<SceneNotification>::default());

    world.insert_resource(RoadBounds::new(config.playfield(), player_car.size(config.playfield(), config.device)));
    world.insert_resource(factory);
    world.insert_resource(catalog);
    world.insert_resource(SessionContext {
        player_car,
        baseline: config.difficulty,
        fuel_pickup_refill: config.fuel_pickup_refill,
        enforce_collision_shapes: config.enforce_collision_shapes,
        sessions: 1,
    });
    world.insert_resource(config.difficulty);
    world.insert_resource(config.escalation);
    world.insert_resource(SceneRng::new(Some(TEST_SEED)));
    world.insert_resource(DeltaTime::from_seconds(FRAME));

    world.insert_resource(Score::default());
    world.insert_resource(Fuel::default());
    world.insert_resource(PlayerLives::default());
    world.insert_resource(GameOver::default());
    world.insert_resource(PauseState::default());
    world.insert_resource(SceneState::Running);
    world.insert_resource(GotReward::default());
    world.insert_resource(GameStage::default());
    world.insert_resource(PendingGameOver::default());
    world.insert_resource(TrafficClear::default());
    world.insert_resource(SpawnSchedule::default());
    world.insert_resource(MotionSampler::default());
    world.insert_resource(ContactMemory::default());
    world.insert_non_send_resource(MotionInput::default());

    world
}

pub fn spawn_blueprint(world: &mut World, blueprint: Blueprint, position: Vec2) -> Entity {
    let factory = *world.resource::<EntityFactory>();
    factory.create(blueprint).at(position).spawn_in(world, ())
}

pub fn player_start(world: &World) -> Vec2 {
    let factory = world.resource::<EntityFactory>();
    world.resource::<RoadBounds>().start_position(factory.playfield)
}

pub fn spawn_test_player(world: &mut World) -> Entity {
    let start = player_start(world);
    let car = world.resource::<SessionContext>().player_car;
    spawn_blueprint(world, Blueprint::Player(car), start)
}

pub fn spawn_test_car(world: &mut World, position: Vec2) -> Entity {
    spawn_blueprint(world, Blueprint::TrafficCar(CarDescriptor::new(3)), position)
}

pub fn spawn_test_coin(world: &mut World, kind: CoinKind, position: Vec2) -> Entity {
    spawn_blueprint(world, Blueprint::Coin(kind), position)
}

pub fn spawn_test_fuel(world: &mut World, position: Vec2) -> Entity {
    spawn_blueprint(world, Blueprint::Fuel, position)
}

/// Sends a game event to the world
pub fn send_game_event(world: &mut World, event: GameEvent) {
    let mut events = world.resource_mut::<Events<GameEvent>>();
    events.send(event);
}

pub fn send_command(world: &mut World, command: GameCommand) {
    send_game_event(world, GameEvent::Command(command));
}

/// Sends a begin-contact event between two entities
pub fn send_contact_event(world: &mut World, a: Entity, b: Entity) {
    send_game_event(world, GameEvent::Contact(a, b));
}

pub fn drain_notifications(world: &mut World) -> Vec<SceneNotification> {
    world.resource_mut::<Events<SceneNotification>>().drain().collect()
}

pub fn drain_game_over(world: &mut World) -> Vec<GameOverTriggered> {
    world.resource_mut::<Events<GameOverTriggered>>().drain().collect()
}

pub fn difficulty(world: &World) -> DifficultyParameters {
    *world.resource::<DifficultyParameters>()
}

pub fn escalation(world: &World) -> EscalationStep {
    *world.resource::<EscalationStep>()
}

/// Remembers every notification the scene delivers.
#[derive(Default)]
pub struct RecordingDelegate {
    pub notifications: RefCell<Vec<SceneNotification>>,
}

impl RecordingDelegate {
    pub fn take(&self) -> Vec<SceneNotification> {
        std::mem::take(&mut *self.notifications.borrow_mut())
    }

    pub fn count(&self, predicate: impl Fn(&SceneNotification) -> bool) -> usize {
        self.notifications.borrow().iter().filter(|n| predicate(n)).count()
    }

    pub fn states(&self) -> Vec<SceneState> {
        self.notifications
            .borrow()
            .iter()
            .filter_map(|n| match n {
                SceneNotification::StateUpdated(state) => Some(*state),
                _ => None,
            })
            .collect()
    }
}

impl SceneDelegate for RecordingDelegate {
    fn did_update_score(&self, score: f64) {
        self.notifications.borrow_mut().push(SceneNotification::ScoreUpdated(score));
    }

    fn will_update_life_count(&self, count: u8) {
        self.notifications
            .borrow_mut()
            .push(SceneNotification::LifeCountWillUpdate(count));
    }

    fn did_update_remaining_fuel(&self, fuel: f32) {
        self.notifications.borrow_mut().push(SceneNotification::FuelUpdated(fuel));
    }

    fn did_finish_game(&self, score: f64) {
        self.notifications.borrow_mut().push(SceneNotification::GameFinished(score));
    }

    fn did_update_game_state(&self, state: SceneState) {
        self.notifications.borrow_mut().push(SceneNotification::StateUpdated(state));
    }
}

/// Builds and starts a scene from the test configuration.
pub fn started_scene() -> GameScene {
    let mut scene = GameScene::new(test_config()).expect("test config is valid");
    scene.start().expect("fresh scene starts");
    scene
}

pub fn spawn_in_scene(scene: &mut GameScene, blueprint: Blueprint, position: Vec2) -> Entity {
    spawn_blueprint(scene.world_mut(), blueprint, position)
}

/// Advances a scene by whole frames until at least `seconds` have passed.
pub fn run_for(scene: &mut GameScene, seconds: f32) {
    let frames = (seconds / FRAME).ceil() as u32;
    for _ in 0..frames {
        scene.tick(FRAME);
    }
}
