use bevy_ecs::{component::Component, resource::Resource};
use bitflags::bitflags;
use glam::Vec2;
use strum_macros::{EnumIter, IntoStaticStr};

bitflags! {
    /// Physics categories. A body reports contacts with every category in its contact mask.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Category: u32 {
        const PLAYER = 0x1;
        const CAR = 0x10;
        const COIN = 0x100;
        const FUEL = 0x1000;
    }
}

/// Collision shape of a body, centered on its [`Position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle covering the entity's [`Size`].
    Rect,
    /// Circle inscribed in the entity's [`Size`] (uses the width as the diameter).
    Circle,
}

/// Physics classification of an entity.
///
/// `collides` is kept for completeness but is always empty: nothing in the game physically
/// blocks anything else, every interaction goes through contact resolution.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub category: Category,
    pub contacts: Category,
    pub collides: Category,
    pub shape: Shape,
}

impl PhysicsBody {
    pub fn new(category: Category, contacts: Category, shape: Shape) -> Self {
        Self {
            category,
            contacts,
            collides: Category::empty(),
            shape,
        }
    }

    /// Returns true if either body wants to hear about touching the other.
    pub fn contacts_with(&self, other: &PhysicsBody) -> bool {
        self.contacts.intersects(other.category) || other.contacts.intersects(self.category)
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum CoinKind {
    #[strum(serialize = "single_coin")]
    Single,
    #[strum(serialize = "multiple_coins")]
    Multiple,
    #[strum(serialize = "coin_bag")]
    Bag,
}

impl CoinKind {
    pub fn value(self) -> f64 {
        match self {
            CoinKind::Single => 10.0,
            CoinKind::Multiple => 25.0,
            CoinKind::Bag => 50.0,
        }
    }

    /// Maps a uniform roll in `0..=10` to a coin: 0-5 single, 6-8 multiple, 9-10 bag.
    pub fn from_roll(roll: u8) -> Self {
        match roll {
            0..=5 => CoinKind::Single,
            6..=8 => CoinKind::Multiple,
            _ => CoinKind::Bag,
        }
    }

    pub fn asset_name(self) -> &'static str {
        self.into()
    }
}

/// A tag component denoting the type of entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    PlayerCar,
    TrafficCar,
    Coin(CoinKind),
    Fuel,
    RoadLine,
}

impl EntityKind {
    pub fn category(&self) -> Option<Category> {
        match self {
            EntityKind::PlayerCar => Some(Category::PLAYER),
            EntityKind::TrafficCar => Some(Category::CAR),
            EntityKind::Coin(_) => Some(Category::COIN),
            EntityKind::Fuel => Some(Category::FUEL),
            EntityKind::RoadLine => None,
        }
    }

    /// The physics body every entity of this kind gets, if it has one at all.
    pub fn physics_body(&self) -> Option<PhysicsBody> {
        match self {
            EntityKind::PlayerCar => Some(PhysicsBody::new(Category::PLAYER, Category::CAR, Shape::Rect)),
            EntityKind::TrafficCar => Some(PhysicsBody::new(Category::CAR, Category::PLAYER, Shape::Rect)),
            EntityKind::Coin(_) => Some(PhysicsBody::new(Category::COIN, Category::PLAYER, Shape::Circle)),
            EntityKind::Fuel => Some(PhysicsBody::new(
                Category::FUEL,
                Category::PLAYER | Category::COIN | Category::CAR,
                Shape::Circle,
            )),
            EntityKind::RoadLine => None,
        }
    }

    pub fn score_value(&self) -> Option<f64> {
        match self {
            EntityKind::Coin(kind) => Some(kind.value()),
            _ => None,
        }
    }

    pub fn is_pickup(&self) -> bool {
        matches!(self, EntityKind::Coin(_) | EntityKind::Fuel)
    }
}

/// Center of an entity, in playfield points (y grows upward, origin at the bottom-left).
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Size(pub Vec2);

impl Size {
    pub fn half(&self) -> Vec2 {
        self.0 * 0.5
    }
}

/// Z-order; higher layers are drawn on top.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Layer(pub i8);

/// The catalog entry a car entity was built from.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarModel {
    pub index: u8,
}

/// A tag component for the entity steered by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// Cosmetic entities that carry no gameplay meaning.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Explosion,
}

/// Linear vertical motion from `from` to `to`; the entity is removed once it arrives.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Fall {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl Fall {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advances the motion and returns the new y coordinate.
    pub fn advance(&mut self, seconds: f32) -> f32 {
        self.elapsed = (self.elapsed + seconds).min(self.duration);
        self.current()
    }

    pub fn current(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x && self.min.y < other.max.y && other.min.y < self.max.y
    }
}

/// The rectangle the player's center is confined to.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct RoadBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl RoadBounds {
    /// Derives the bounds from the playfield and the player's size.
    ///
    /// A player larger than the playfield collapses the range to its center line.
    pub fn new(playfield: Vec2, player_size: Vec2) -> Self {
        let half = player_size * 0.5;
        let min_x = half.x;
        let max_x = (playfield.x - half.x).max(min_x);
        let min_y = half.y + crate::constants::mechanics::ROAD_BOTTOM_PADDING;
        let max_y = (playfield.y - half.y).max(min_y);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x.clamp(self.min_x, self.max_x), point.y.clamp(self.min_y, self.max_y))
    }

    pub fn contains(&self, point: Vec2) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_y..=self.max_y).contains(&point.y)
    }

    /// Where the player starts: horizontally centered on the playfield, at the bottom of the road.
    pub fn start_position(&self, playfield: Vec2) -> Vec2 {
        Vec2::new((playfield.x * 0.5).clamp(self.min_x, self.max_x), self.min_y)
    }
}

/// Seconds elapsed since the previous tick.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DeltaTime {
    pub seconds: f32,
}

impl DeltaTime {
    pub fn from_seconds(seconds: f32) -> Self {
        Self { seconds }
    }
}
