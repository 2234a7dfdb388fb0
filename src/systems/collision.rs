use std::collections::BTreeSet;

use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::events::GameEvent;
use crate::systems::components::{Aabb, Category, EntityKind, PhysicsBody, Position, Shape, Size};
use crate::systems::session::{ScoreKeeper, SessionContext};

/// One side of a contact, reduced to what resolution needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactBody {
    pub entity: Entity,
    pub category: Category,
    /// Points awarded for picking this body up, if any.
    pub value: Option<f64>,
}

impl ContactBody {
    pub fn new(entity: Entity, kind: &EntityKind, body: &PhysicsBody) -> Self {
        Self {
            entity,
            category: body.category,
            value: kind.score_value(),
        }
    }
}

/// State changes caused by a single contact.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContactDelta {
    pub score: f64,
    pub fuel: f32,
    pub lives: i8,
    pub remove: SmallVec<[Entity; 2]>,
}

impl ContactDelta {
    pub fn is_empty(&self) -> bool {
        self.score == 0.0 && self.fuel == 0.0 && self.lives == 0 && self.remove.is_empty()
    }
}

/// Classifies a contact by category and returns what it changes.
///
/// The order of `a` and `b` does not matter.
pub fn resolve_contact(a: ContactBody, b: ContactBody, fuel_refill: f32) -> ContactDelta {
    let (first, second) = if a.category <= b.category { (a, b) } else { (b, a) };
    let mut delta = ContactDelta::default();

    if first.category == Category::PLAYER && second.category == Category::CAR {
        delta.lives = -1;
        delta.remove.push(second.entity);
    } else if first.category == Category::PLAYER && second.category == Category::COIN {
        delta.score = second.value.unwrap_or(0.0);
        delta.remove.push(second.entity);
    } else if second.category == Category::FUEL && first.category != Category::FUEL {
        // Fuel cans vanish on anything they touch; only the player gets to drink them.
        if first.category == Category::PLAYER {
            delta.fuel = fuel_refill;
        }
        delta.remove.push(second.entity);
    }

    delta
}

/// Returns true if two shapes overlap (strictly; touching edges do not count).
pub fn shapes_overlap(a: (Vec2, Vec2, Shape), b: (Vec2, Vec2, Shape)) -> bool {
    let (a_center, a_size, a_shape) = a;
    let (b_center, b_size, b_shape) = b;

    match (a_shape, b_shape) {
        (Shape::Rect, Shape::Rect) => {
            Aabb::from_center(a_center, a_size).intersects(&Aabb::from_center(b_center, b_size))
        }
        (Shape::Circle, Shape::Circle) => {
            let reach = (a_size.x + b_size.x) * 0.5;
            a_center.distance_squared(b_center) < reach * reach
        }
        (Shape::Circle, Shape::Rect) => circle_hits_rect(a_center, a_size.x * 0.5, b_center, b_size),
        (Shape::Rect, Shape::Circle) => circle_hits_rect(b_center, b_size.x * 0.5, a_center, a_size),
    }
}

fn circle_hits_rect(center: Vec2, radius: f32, rect_center: Vec2, rect_size: Vec2) -> bool {
    let rect = Aabb::from_center(rect_center, rect_size);
    let closest = center.clamp(rect.min, rect.max);
    center.distance_squared(closest) < radius * radius
}

/// Pairs that were touching at the end of the previous detection pass.
#[derive(Resource, Debug, Default)]
pub struct ContactMemory(pub BTreeSet<(Entity, Entity)>);

fn ordered(a: Entity, b: Entity) -> (Entity, Entity) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Detects bodies that started touching this tick and reports each pair once.
///
/// A pair stays silent while it keeps overlapping and is reported again only after it
/// separates and touches anew.
pub fn contact_detection_system(
    bodies: Query<(Entity, &Position, &Size, &PhysicsBody)>,
    mut memory: ResMut<ContactMemory>,
    mut events: EventWriter<GameEvent>,
) {
    let mut touching = BTreeSet::new();

    for [(a, a_pos, a_size, a_body), (b, b_pos, b_size, b_body)] in bodies.iter_combinations() {
        if !a_body.contacts_with(b_body) {
            continue;
        }

        if shapes_overlap((a_pos.0, a_size.0, a_body.shape), (b_pos.0, b_size.0, b_body.shape)) {
            touching.insert(ordered(a, b));
        }
    }

    for &(a, b) in touching.difference(&memory.0) {
        trace!(?a, ?b, "Contact began");
        events.write(GameEvent::Contact(a, b));
    }

    memory.0 = touching;
}

/// Applies begin-contact events to the session.
pub fn contact_resolution_system(
    mut commands: Commands,
    mut events: EventReader<GameEvent>,
    mut keeper: ScoreKeeper,
    context: Res<SessionContext>,
    bodies: Query<(&EntityKind, &PhysicsBody)>,
) {
    let mut removed: SmallVec<[Entity; 8]> = SmallVec::new();

    for event in events.read() {
        let GameEvent::Contact(a, b) = *event else {
            continue;
        };

        // Either side may already be gone after an earlier contact this tick.
        if removed.contains(&a) || removed.contains(&b) {
            continue;
        }
        let (Ok((a_kind, a_body)), Ok((b_kind, b_body))) = (bodies.get(a), bodies.get(b)) else {
            continue;
        };

        let delta = resolve_contact(
            ContactBody::new(a, a_kind, a_body),
            ContactBody::new(b, b_kind, b_body),
            context.fuel_pickup_refill,
        );
        if delta.is_empty() {
            continue;
        }

        if delta.lives < 0 {
            // The wreck is over already; nothing left to lose.
            if keeper.is_game_over() {
                continue;
            }
            keeper.lose_life();
        }

        if delta.score > 0.0 {
            keeper.add_score(delta.score);
        }

        if delta.fuel > 0.0 {
            let refilled = keeper.fuel() + delta.fuel;
            keeper.set_fuel(refilled);
        }

        for entity in delta.remove {
            debug!(?entity, "Removing entity after contact");
            commands.entity(entity).try_despawn();
            removed.push(entity);
        }
    }
}
