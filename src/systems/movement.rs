use bevy_ecs::{
    entity::Entity,
    system::{Commands, Query, Res},
};
use tracing::trace;

use crate::constants::mechanics;
use crate::systems::components::{DeltaTime, EntityKind, Fall, Position};
use crate::systems::session::ScoreKeeper;

/// Moves falling entities down the road and removes them once they reach the bottom.
///
/// A traffic car that makes it all the way down without hitting the player is worth a point,
/// unless the session is already over.
pub fn fall_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut keeper: ScoreKeeper,
    mut falling: Query<(Entity, &mut Fall, &mut Position, &EntityKind)>,
) {
    for (entity, mut fall, mut position, kind) in falling.iter_mut() {
        position.0.y = fall.advance(dt.seconds);
        if !fall.finished() {
            continue;
        }

        commands.entity(entity).try_despawn();

        if *kind == EntityKind::TrafficCar && !keeper.is_game_over() {
            trace!(?entity, "Traffic car passed");
            keeper.add_score(mechanics::CAR_PASS_SCORE);
        }
    }
}
