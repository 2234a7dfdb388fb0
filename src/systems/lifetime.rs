use bevy_ecs::{
    component::Component,
    entity::Entity,
    system::{Commands, Query, Res},
};

use crate::systems::DeltaTime;

/// Seconds left before a transient effect (the crash explosion) leaves the road.
#[derive(Component, Debug, Clone, Copy)]
pub struct TimeToLive {
    pub remaining_seconds: f32,
}

impl TimeToLive {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining_seconds: seconds,
        }
    }

    /// Counts down by `seconds`. Returns true once nothing is left.
    pub fn tick(&mut self, seconds: f32) -> bool {
        if self.remaining_seconds <= seconds {
            self.remaining_seconds = 0.0;
            return true;
        }
        self.remaining_seconds -= seconds;
        false
    }
}

pub fn time_to_live_system(mut commands: Commands, dt: Res<DeltaTime>, mut query: Query<(Entity, &mut TimeToLive)>) {
    for (entity, mut ttl) in query.iter_mut() {
        if ttl.tick(dt.seconds) {
            commands.entity(entity).try_despawn();
        }
    }
}
