use drive_fast::config::DeviceClass;
use drive_fast::constants::{layer, layout};
use drive_fast::error::ConfigError;
use drive_fast::systems::components::{Category, CoinKind, EntityKind, Shape};
use drive_fast::systems::factory::{Blueprint, CarCatalog, CarDescriptor, EntityFactory};
use glam::Vec2;
use pretty_assertions::assert_eq;
use rand::{rngs::SmallRng, SeedableRng};
use speculoos::prelude::*;
use strum::IntoEnumIterator;

const PHONE: Vec2 = Vec2::new(375.0, 812.0);

#[test]
fn test_car_ratio_by_index_and_device() {
    // Indices up to 4 are the bigger models.
    assert_that(&CarDescriptor::new(0).ratio(DeviceClass::Phone)).is_equal_to(6.0);
    assert_that(&CarDescriptor::new(4).ratio(DeviceClass::Phone)).is_equal_to(6.0);
    assert_that(&CarDescriptor::new(5).ratio(DeviceClass::Phone)).is_equal_to(7.0);
    assert_that(&CarDescriptor::new(20).ratio(DeviceClass::Phone)).is_equal_to(5.0);

    assert_that(&CarDescriptor::new(0).ratio(DeviceClass::Tablet)).is_equal_to(11.0);
    assert_that(&CarDescriptor::new(5).ratio(DeviceClass::Tablet)).is_equal_to(12.0);
    assert_that(&CarDescriptor::new(20).ratio(DeviceClass::Tablet)).is_equal_to(10.0);
}

#[test]
fn test_car_size_uses_aspect() {
    let car = CarDescriptor::new(0).size(PHONE, DeviceClass::Phone);
    assert_eq!(car, Vec2::new(62.5, 125.0));

    let truck = CarDescriptor::new(layout::TRUCK_INDEX).size(PHONE, DeviceClass::Phone);
    assert_that(&truck.x).is_equal_to(75.0);
    assert_that(&truck.y).is_close_to(240.0, 0.001);
}

#[test]
fn test_car_asset_name() {
    assert_that(&CarDescriptor::new(7).asset_name()).is_equal_to("car7".to_string());
}

#[test]
fn test_physics_table() {
    let factory = EntityFactory::new(PHONE, DeviceClass::Phone);

    let player = factory.create(Blueprint::Player(CarDescriptor::new(0)));
    let body = player.extras.body.expect("player has a body");
    assert_that(&body.category).is_equal_to(Category::PLAYER);
    assert_that(&body.contacts).is_equal_to(Category::CAR);
    assert_that(&body.collides.is_empty()).is_true();
    assert_that(&player.extras.player).is_true();

    let car = factory.create(Blueprint::TrafficCar(CarDescriptor::new(2)));
    let body = car.extras.body.expect("car has a body");
    assert_that(&body.category).is_equal_to(Category::CAR);
    assert_that(&body.contacts).is_equal_to(Category::PLAYER);
    assert_that(&body.shape).is_equal_to(Shape::Rect);

    for kind in CoinKind::iter() {
        let coin = factory.create(Blueprint::Coin(kind));
        let body = coin.extras.body.expect("coin has a body");
        assert_that(&body.category).is_equal_to(Category::COIN);
        assert_that(&body.contacts).is_equal_to(Category::PLAYER);
        assert_that(&body.shape).is_equal_to(Shape::Circle);
    }

    let fuel = factory.create(Blueprint::Fuel);
    let body = fuel.extras.body.expect("fuel has a body");
    assert_that(&body.category).is_equal_to(Category::FUEL);
    assert_that(&body.contacts).is_equal_to(Category::PLAYER | Category::COIN | Category::CAR);
    assert_that(&body.collides.is_empty()).is_true();

    let line = factory.create(Blueprint::RoadLine);
    assert_that(&line.extras.body).is_none();
    assert_that(&line.bundle.layer.0).is_equal_to(layer::ROAD);
}

#[test]
fn test_car_without_shape_gets_no_body() {
    let factory = EntityFactory::new(PHONE, DeviceClass::Phone);
    let bare = CarDescriptor {
        has_body: false,
        ..CarDescriptor::new(3)
    };

    let built = factory.create(Blueprint::TrafficCar(bare));
    assert_that(&built.extras.body).is_none();
    assert_that(&built.bundle.kind).is_equal_to(EntityKind::TrafficCar);
}

#[test]
fn test_entities_start_above_the_playfield() {
    let factory = EntityFactory::new(PHONE, DeviceClass::Phone);
    for blueprint in [
        Blueprint::TrafficCar(CarDescriptor::new(1)),
        Blueprint::Coin(CoinKind::Bag),
        Blueprint::Fuel,
        Blueprint::RoadLine,
    ] {
        let built = factory.create(blueprint);
        assert_that(&built.position().y).is_equal_to(PHONE.y + built.size().y);
    }
}

#[test]
fn test_pickup_size_by_device() {
    let phone = EntityFactory::new(PHONE, DeviceClass::Phone);
    assert_eq!(phone.pickup_size(), Vec2::splat(375.0 / 12.0));

    let tablet = EntityFactory::new(Vec2::new(768.0, 1024.0), DeviceClass::Tablet);
    assert_eq!(tablet.pickup_size(), Vec2::splat(32.0));
}

#[test]
fn test_coin_roll_mapping() {
    for roll in 0..=5 {
        assert_that(&CoinKind::from_roll(roll)).is_equal_to(CoinKind::Single);
    }
    for roll in 6..=8 {
        assert_that(&CoinKind::from_roll(roll)).is_equal_to(CoinKind::Multiple);
    }
    for roll in 9..=10 {
        assert_that(&CoinKind::from_roll(roll)).is_equal_to(CoinKind::Bag);
    }
}

#[test]
fn test_coin_values_and_assets() {
    assert_that(&CoinKind::Single.value()).is_equal_to(10.0);
    assert_that(&CoinKind::Multiple.value()).is_equal_to(25.0);
    assert_that(&CoinKind::Bag.value()).is_equal_to(50.0);

    assert_that(&CoinKind::Single.asset_name()).is_equal_to("single_coin");
    assert_that(&CoinKind::Multiple.asset_name()).is_equal_to("multiple_coins");
    assert_that(&CoinKind::Bag.asset_name()).is_equal_to("coin_bag");

    assert_that(&EntityKind::Coin(CoinKind::Bag).score_value()).is_equal_to(Some(50.0));
    assert_that(&EntityKind::Fuel.score_value()).is_none();
}

#[test]
fn test_catalog_lookup_and_fallback() {
    let catalog = CarCatalog::default();
    assert_that(&catalog.cars().len()).is_equal_to(layout::CATALOG_SIZE as usize);
    assert_that(&catalog.get(12).map(|car| car.index)).is_equal_to(Some(12));
    assert_that(&catalog.get(99)).is_none();

    // Unknown selections fall back to the first entry.
    assert_that(&catalog.player_car(99).index).is_equal_to(0);

    let custom = CarCatalog::new(vec![CarDescriptor::new(9), CarDescriptor::new(11)]).unwrap();
    assert_that(&custom.player_car(3).index).is_equal_to(9);
}

#[test]
fn test_empty_catalog_is_rejected() {
    assert_that(&CarCatalog::new(Vec::new()).unwrap_err()).is_equal_to(ConfigError::EmptyCatalog);
}

#[test]
fn test_catalog_choose_stays_in_catalog() {
    let catalog = CarCatalog::new(vec![CarDescriptor::new(2), CarDescriptor::new(8)]).unwrap();
    let mut rng = SmallRng::seed_from_u64(3);
    for _ in 0..50 {
        let car = catalog.choose(&mut rng);
        assert_that(&[2u8, 8u8].contains(&car.index)).is_true();
    }
}
