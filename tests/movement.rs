use bevy_ecs::{entity::Entity, system::RunSystemOnce, world::World};
use drive_fast::systems::components::{CoinKind, DeltaTime, Fall, Position};
use drive_fast::systems::factory::{Blueprint, CarDescriptor, EntityFactory};
use drive_fast::systems::lifetime::{time_to_live_system, TimeToLive};
use drive_fast::systems::movement::fall_system;
use drive_fast::systems::session::{GameOver, Score};
use glam::Vec2;
use speculoos::prelude::*;

mod common;

fn spawn_falling(world: &mut World, blueprint: Blueprint, x: f32, fall: Fall) -> Entity {
    let factory = *world.resource::<EntityFactory>();
    factory
        .create(blueprint)
        .at(Vec2::new(x, fall.from))
        .spawn_in(world, fall)
}

fn step(world: &mut World, seconds: f32) {
    world.insert_resource(DeltaTime::from_seconds(seconds));
    world
        .run_system_once(fall_system)
        .expect("System should run successfully");
}

#[test]
fn test_fall_interpolates_linearly() {
    let mut fall = Fall::new(800.0, 0.0, 4.0);
    assert_that(&fall.advance(1.0)).is_equal_to(600.0);
    assert_that(&fall.advance(2.0)).is_equal_to(200.0);
    assert_that(&fall.finished()).is_false();
    assert_that(&fall.advance(5.0)).is_equal_to(0.0);
    assert_that(&fall.finished()).is_true();
}

#[test]
fn test_zero_duration_fall_lands_immediately() {
    let mut fall = Fall::new(100.0, -10.0, 0.0);
    assert_that(&fall.advance(0.0)).is_equal_to(-10.0);
    assert_that(&fall.finished()).is_true();
}

#[test]
fn test_fall_system_moves_entities_down() {
    let mut world = common::create_test_world();
    let coin = spawn_falling(
        &mut world,
        Blueprint::Coin(CoinKind::Single),
        100.0,
        Fall::new(800.0, -20.0, 4.0),
    );

    step(&mut world, 1.0);
    assert_that(&world.get::<Position>(coin).unwrap().0.y).is_equal_to(595.0);
    // Pickups reaching the bottom are worth nothing.
    step(&mut world, 3.0);
    assert_that(&world.get_entity(coin).is_err()).is_true();
    assert_that(&world.resource::<Score>().0).is_equal_to(0.0);
}

#[test]
fn test_car_leaving_the_road_scores() {
    let mut world = common::create_test_world();
    spawn_falling(
        &mut world,
        Blueprint::TrafficCar(CarDescriptor::new(4)),
        60.0,
        Fall::new(900.0, -60.0, 2.0),
    );
    spawn_falling(
        &mut world,
        Blueprint::TrafficCar(CarDescriptor::new(5)),
        300.0,
        Fall::new(900.0, -60.0, 2.0),
    );

    step(&mut world, 2.5);
    assert_that(&world.resource::<Score>().0).is_equal_to(2.0);
}

#[test]
fn test_car_leaving_after_game_over_scores_nothing() {
    let mut world = common::create_test_world();
    world.insert_resource(GameOver(true));
    let car = spawn_falling(
        &mut world,
        Blueprint::TrafficCar(CarDescriptor::new(4)),
        60.0,
        Fall::new(900.0, -60.0, 1.0),
    );

    step(&mut world, 1.0);
    assert_that(&world.get_entity(car).is_err()).is_true();
    assert_that(&world.resource::<Score>().0).is_equal_to(0.0);
}

#[test]
fn test_time_to_live_expires() {
    let mut world = common::create_test_world();
    let entity = world.spawn(TimeToLive::new(1.0)).id();

    world.insert_resource(DeltaTime::from_seconds(0.6));
    world
        .run_system_once(time_to_live_system)
        .expect("System should run successfully");
    let remaining = world.get::<TimeToLive>(entity).unwrap().remaining_seconds;
    assert_that(&remaining).is_close_to(0.4, 1e-6);

    world
        .run_system_once(time_to_live_system)
        .expect("System should run successfully");
    assert_that(&world.get_entity(entity).is_err()).is_true();
}

#[test]
fn test_time_to_live_tick_reports_expiry() {
    let mut ttl = TimeToLive::new(1.0);
    assert_that(&ttl.tick(0.75)).is_false();
    assert_that(&ttl.remaining_seconds).is_equal_to(0.25);
    assert_that(&ttl.tick(0.25)).is_true();
    assert_that(&ttl.remaining_seconds).is_equal_to(0.0);
}
