//! Builds fresh entity bundles from static descriptors.

use bevy_ecs::{
    bundle::Bundle,
    entity::Entity,
    resource::Resource,
    system::Commands,
    world::World,
};
use glam::Vec2;
use rand::Rng;
use tracing::warn;

use crate::config::DeviceClass;
use crate::constants::{layer, layout};
use crate::error::ConfigError;
use crate::systems::components::{
    CarModel, CoinKind, EntityKind, Layer, PhysicsBody, PlayerControlled, Position, Size,
};

/// A car asset the game can spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarDescriptor {
    pub index: u8,
    /// Height divided by width.
    pub aspect: f32,
    /// Whether the asset ships a collision shape.
    pub has_body: bool,
}

impl CarDescriptor {
    pub fn new(index: u8) -> Self {
        let aspect = if index == layout::TRUCK_INDEX {
            layout::TRUCK_ASPECT
        } else {
            layout::CAR_ASPECT
        };
        Self {
            index,
            aspect,
            has_body: true,
        }
    }

    pub fn asset_name(&self) -> String {
        format!("car{}", self.index)
    }

    /// How many cars of this model fit across the playfield.
    ///
    /// Smaller models (index above 4) get one extra slot, the truck two fewer, and
    /// wide-aspect devices three more.
    pub fn ratio(&self, device: DeviceClass) -> f32 {
        let mut ratio = device.scale_ratio() + if self.index > 4 { 3.0 } else { 2.0 };
        if self.index == layout::TRUCK_INDEX {
            ratio -= 2.0;
        }
        if device.is_wide() {
            ratio += 3.0;
        }
        ratio
    }

    pub fn size(&self, playfield: Vec2, device: DeviceClass) -> Vec2 {
        let width = playfield.x / self.ratio(device);
        Vec2::new(width, width * self.aspect)
    }
}

/// The cars available in a session.
#[derive(Resource, Debug, Clone)]
pub struct CarCatalog {
    cars: Vec<CarDescriptor>,
}

impl Default for CarCatalog {
    fn default() -> Self {
        Self {
            cars: (0..layout::CATALOG_SIZE).map(CarDescriptor::new).collect(),
        }
    }
}

impl CarCatalog {
    pub fn new(cars: Vec<CarDescriptor>) -> Result<Self, ConfigError> {
        if cars.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(Self { cars })
    }

    pub fn cars(&self) -> &[CarDescriptor] {
        &self.cars
    }

    pub fn get(&self, index: u8) -> Option<CarDescriptor> {
        self.cars.iter().find(|car| car.index == index).copied()
    }

    /// Looks up the player's selected car, falling back to the first entry for unknown indices.
    pub fn player_car(&self, index: u8) -> CarDescriptor {
        self.get(index).unwrap_or_else(|| {
            warn!(index, fallback = self.cars[0].index, "Unknown player car, using fallback");
            self.cars[0]
        })
    }

    /// Picks a uniformly random car.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> CarDescriptor {
        self.cars[rng.random_range(0..self.cars.len())]
    }
}

/// Everything the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Blueprint {
    Player(CarDescriptor),
    TrafficCar(CarDescriptor),
    Coin(CoinKind),
    Fuel,
    RoadLine,
}

/// A freshly built entity, positioned just above the top edge of the playfield.
#[derive(Bundle, Debug, Clone)]
pub struct EntityBundle {
    pub kind: EntityKind,
    pub position: Position,
    pub size: Size,
    pub layer: Layer,
}

/// The optional parts of a built entity, attached alongside the [`EntityBundle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Extras {
    pub body: Option<PhysicsBody>,
    pub model: Option<CarModel>,
    pub player: bool,
}

#[derive(Debug, Clone)]
pub struct Built {
    pub bundle: EntityBundle,
    pub extras: Extras,
}

impl Built {
    pub fn at(mut self, position: Vec2) -> Self {
        self.bundle.position = Position(position);
        self
    }

    pub fn size(&self) -> Vec2 {
        self.bundle.size.0
    }

    pub fn position(&self) -> Vec2 {
        self.bundle.position.0
    }

    pub fn spawn(self, commands: &mut Commands, extra: impl Bundle) -> Entity {
        let mut entity = commands.spawn((self.bundle, extra));
        if let Some(body) = self.extras.body {
            entity.insert(body);
        }
        if let Some(model) = self.extras.model {
            entity.insert(model);
        }
        if self.extras.player {
            entity.insert(PlayerControlled);
        }
        entity.id()
    }

    pub fn spawn_in(self, world: &mut World, extra: impl Bundle) -> Entity {
        let mut entity = world.spawn((self.bundle, extra));
        if let Some(body) = self.extras.body {
            entity.insert(body);
        }
        if let Some(model) = self.extras.model {
            entity.insert(model);
        }
        if self.extras.player {
            entity.insert(PlayerControlled);
        }
        entity.id()
    }
}

/// Sizes and classifies entities for one playfield.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct EntityFactory {
    pub playfield: Vec2,
    pub device: DeviceClass,
}

impl EntityFactory {
    pub fn new(playfield: Vec2, device: DeviceClass) -> Self {
        Self { playfield, device }
    }

    pub fn pickup_size(&self) -> Vec2 {
        Vec2::splat(self.playfield.x / self.device.pickup_divisor())
    }

    pub fn create(&self, blueprint: Blueprint) -> Built {
        let (kind, size, layer, model) = match blueprint {
            Blueprint::Player(car) => (
                EntityKind::PlayerCar,
                car.size(self.playfield, self.device),
                layer::PLAYER,
                Some(CarModel { index: car.index }),
            ),
            Blueprint::TrafficCar(car) => (
                EntityKind::TrafficCar,
                car.size(self.playfield, self.device),
                layer::TRAFFIC,
                Some(CarModel { index: car.index }),
            ),
            Blueprint::Coin(coin) => (EntityKind::Coin(coin), self.pickup_size(), layer::PICKUP, None),
            Blueprint::Fuel => (EntityKind::Fuel, self.pickup_size(), layer::PICKUP, None),
            Blueprint::RoadLine => (EntityKind::RoadLine, layout::ROAD_LINE_SIZE, layer::ROAD, None),
        };

        // Traffic models without a collision shape get no body at all.
        let body = match blueprint {
            Blueprint::TrafficCar(car) if !car.has_body => None,
            _ => kind.physics_body(),
        };

        Built {
            bundle: EntityBundle {
                kind,
                position: Position(Vec2::new(0.0, self.playfield.y + size.y)),
                size: Size(size),
                layer: Layer(layer),
            },
            extras: Extras {
                body,
                model,
                player: matches!(blueprint, Blueprint::Player(_)),
            },
        }
    }
}
