use bevy_ecs::prelude::*;

use crate::systems::state::{GameOverReason, SceneState};

/// Requests coming from outside the game loop (UI, app lifecycle, ad collaborator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    /// Pause or resume gameplay. Swallowed once after [`GameCommand::StayPaused`].
    SetPaused(bool),
    /// The application is resigning active; the next pause/resume request is ignored.
    StayPaused,
    /// A reward was granted: revive the player and continue the session.
    Revive,
    /// A reward ad is about to be presented.
    PresentRewardAd,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
    /// Two bodies started touching.
    Contact(Entity, Entity),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

/// A repeating spawn-schedule task came due.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduledTask {
    AddCoin,
    AddFuel,
    AddCar,
    AddRoadLine,
    BurnFuel,
}

/// The difficulty escalated; carries the new level.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyChanged {
    pub level: u32,
}

/// The session just ended. Emitted at most once per session (until a revive).
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOverTriggered(pub GameOverReason);

/// Outbound notifications, forwarded to the [`crate::game::SceneDelegate`] after each tick.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum SceneNotification {
    ScoreUpdated(f64),
    /// Sent before the life count changes, carrying the new count.
    LifeCountWillUpdate(u8),
    FuelUpdated(f32),
    GameFinished(f64),
    StateUpdated(SceneState),
}
