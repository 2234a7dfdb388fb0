use bevy_ecs::{
    entity::Entity,
    event::EventReader,
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut, SystemParam},
};
use tracing::{debug, info, warn};

use crate::constants::{layer, timing};
use crate::events::{GameCommand, GameEvent, GameOverTriggered, SceneNotification};
use crate::systems::components::{DeltaTime, Effect, EntityKind, Layer, PlayerControlled, Position, RoadBounds, Size};
use crate::systems::factory::{Blueprint, EntityFactory};
use crate::systems::input::MotionSampler;
use crate::systems::lifetime::TimeToLive;
use crate::systems::session::{ScoreKeeper, SessionContext};

/// The externally visible state of the scene.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SceneState {
    /// Built but not started yet.
    #[default]
    Loading,
    Running,
    Paused,
    /// The session ended and the post-game routing has not happened yet.
    GameOver,
    /// The session ended without a redeemed reward; the host should offer one.
    Advertisement,
    /// The session ended for good; the host should return to its menu.
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum GameOverReason {
    RunningOutOfFuel,
    Crash,
}

/// Pause flag with a one-shot override.
///
/// After [`PauseState::stay`] is called while paused, the next request is ignored, whatever
/// it asks for. Any request clears the override.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PauseState {
    paused: bool,
    stay_paused: bool,
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_sticky(&self) -> bool {
        self.stay_paused
    }

    /// Applies a pause request. Returns false if it was swallowed by the override.
    pub fn request(&mut self, paused: bool) -> bool {
        let applied = !self.stay_paused;
        if applied {
            self.paused = paused;
        }
        self.stay_paused = false;
        applied
    }

    /// Arms the override. Has no effect unless currently paused.
    pub fn stay(&mut self) {
        if self.paused {
            self.stay_paused = true;
        }
    }
}

/// Whether a reward was redeemed during this session.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GotReward(pub bool);

/// A resource to track the overall stage of the game from a high-level perspective.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub enum GameStage {
    #[default]
    Playing,
    /// The player crashed; the explosion plays out before routing.
    Crashing { remaining_seconds: f32 },
    /// Routing happened; waiting for a revive or a reset.
    Over,
}

/// The reason the session ended, held until [`stage_system`] plays it out.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingGameOver(pub Option<GameOverReason>);

/// A pending removal of all traffic, counted down even while paused.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct TrafficClear {
    remaining_seconds: Option<f32>,
}

impl TrafficClear {
    pub fn arm(&mut self, seconds: f32) {
        self.remaining_seconds = Some(seconds);
    }

    pub fn is_pending(&self) -> bool {
        self.remaining_seconds.is_some()
    }

    /// Counts down and returns true exactly once, when the delay runs out.
    pub fn tick(&mut self, seconds: f32) -> bool {
        match self.remaining_seconds {
            Some(remaining) if remaining <= seconds => {
                self.remaining_seconds = None;
                true
            }
            Some(remaining) => {
                self.remaining_seconds = Some(remaining - seconds);
                false
            }
            None => false,
        }
    }
}

/// Run condition for gameplay systems: the session has started, has not been left, and
/// is not paused.
pub fn gameplay_active(state: Res<SceneState>, pause: Res<PauseState>) -> bool {
    !pause.is_paused() && !matches!(*state, SceneState::Loading | SceneState::Home)
}

/// Pause handling, state transitions and post-game routing.
#[derive(SystemParam)]
pub struct SceneControl<'w> {
    pub keeper: ScoreKeeper<'w>,
    pause: ResMut<'w, PauseState>,
    state: ResMut<'w, SceneState>,
    got_reward: ResMut<'w, GotReward>,
    sampler: ResMut<'w, MotionSampler>,
}

impl SceneControl<'_> {
    pub fn state(&self) -> SceneState {
        *self.state
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn set_state(&mut self, state: SceneState) {
        if *self.state == state {
            return;
        }

        debug!(from = %*self.state, to = %state, "Scene state changed");
        *self.state = state;
        self.keeper.notify(SceneNotification::StateUpdated(state));
    }

    /// Pauses or resumes gameplay and the motion sampler together.
    pub fn set_paused_and_notify(&mut self, paused: bool) {
        if !self.pause.request(paused) {
            debug!(paused, "Pause request ignored once");
        }

        let paused = self.pause.is_paused();
        if paused {
            self.sampler.stop();
        } else {
            self.sampler.start();
        }

        match (*self.state, paused) {
            (SceneState::Running, true) => self.set_state(SceneState::Paused),
            (SceneState::Paused, false) => self.set_state(SceneState::Running),
            _ => {}
        }
    }

    pub fn stay_paused(&mut self) {
        self.pause.stay();
    }

    pub fn grant_reward(&mut self) {
        self.got_reward.0 = true;
    }

    /// Routes the host after a finished session: offer a reward first, go home after.
    pub fn stop_game(&mut self) {
        if !self.got_reward.0 {
            self.set_paused_and_notify(true);
            self.set_state(SceneState::Advertisement);
        } else {
            self.set_state(SceneState::Home);
        }
    }

    /// Routes the host and reports the final score.
    pub fn finish_game(&mut self) {
        self.stop_game();
        let score = self.keeper.score();
        info!(score, "Game finished");
        self.keeper.notify(SceneNotification::GameFinished(score));
    }
}

/// Applies inbound [`GameCommand`]s. Runs every tick, paused or not.
#[allow(clippy::too_many_arguments)]
pub fn command_system(
    mut commands: Commands,
    mut events: EventReader<GameEvent>,
    mut control: SceneControl,
    mut stage: ResMut<GameStage>,
    mut clear: ResMut<TrafficClear>,
    factory: Res<EntityFactory>,
    context: Res<SessionContext>,
    bounds: Option<Res<RoadBounds>>,
    mut players: Query<&mut Position, With<PlayerControlled>>,
) {
    for event in events.read() {
        let GameEvent::Command(command) = *event else {
            continue;
        };

        debug!(?command, "Handling command");
        match command {
            GameCommand::SetPaused(paused) => control.set_paused_and_notify(paused),
            GameCommand::StayPaused => control.stay_paused(),
            GameCommand::PresentRewardAd => {
                control.grant_reward();
                clear.arm(timing::TRAFFIC_CLEAR_DELAY);
            }
            GameCommand::Revive => {
                let Some(bounds) = bounds.as_deref() else {
                    warn!("Revive requested before the session started");
                    continue;
                };

                let start = bounds.start_position(factory.playfield);
                if players.is_empty() {
                    factory
                        .create(Blueprint::Player(context.player_car))
                        .at(start)
                        .spawn(&mut commands, ());
                } else {
                    for mut position in players.iter_mut() {
                        position.0 = start;
                    }
                }

                control.keeper.revive();
                *stage = GameStage::Playing;
                control.set_paused_and_notify(false);
                let state = if control.is_paused() {
                    SceneState::Paused
                } else {
                    SceneState::Running
                };
                control.set_state(state);
                info!(lives = control.keeper.lives(), "Player revived");
            }
        }
    }
}

/// Moves game-over triggers into [`PendingGameOver`]. Kept apart from [`stage_system`],
/// whose [`ScoreKeeper`] writes the same events.
pub fn record_game_over_system(mut triggers: EventReader<GameOverTriggered>, mut pending: ResMut<PendingGameOver>) {
    if let Some(GameOverTriggered(reason)) = triggers.read().last() {
        pending.0 = Some(*reason);
    }
}

/// Reacts to the end of a session and plays out the crash sequence.
pub fn stage_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut stage: ResMut<GameStage>,
    mut control: SceneControl,
    mut pending: ResMut<PendingGameOver>,
    players: Query<(Entity, &Position, &Size), With<PlayerControlled>>,
) {
    if let Some(reason) = pending.0.take() {
        control.set_state(SceneState::GameOver);

        match reason {
            GameOverReason::Crash => {
                for (entity, position, size) in players.iter() {
                    commands.spawn((
                        Effect::Explosion,
                        *position,
                        *size,
                        Layer(layer::EFFECT),
                        TimeToLive::new(timing::CRASH_SEQUENCE_DURATION),
                    ));
                    commands.entity(entity).try_despawn();
                }
                *stage = GameStage::Crashing {
                    remaining_seconds: timing::CRASH_SEQUENCE_DURATION,
                };
            }
            GameOverReason::RunningOutOfFuel => {
                control.finish_game();
                *stage = GameStage::Over;
            }
        }
        return;
    }

    if let GameStage::Crashing { remaining_seconds } = *stage {
        if remaining_seconds <= dt.seconds {
            control.finish_game();
            *stage = GameStage::Over;
        } else {
            *stage = GameStage::Crashing {
                remaining_seconds: remaining_seconds - dt.seconds,
            };
        }
    }
}

/// Clears the road of traffic once a pending [`TrafficClear`] runs out.
pub fn traffic_clear_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut clear: ResMut<TrafficClear>,
    cars: Query<(Entity, &EntityKind)>,
) {
    if !clear.tick(dt.seconds) {
        return;
    }

    let mut removed = 0usize;
    for (entity, kind) in cars.iter() {
        if *kind == EntityKind::TrafficCar {
            commands.entity(entity).try_despawn();
            removed += 1;
        }
    }
    info!(removed, "Cleared traffic");
}
