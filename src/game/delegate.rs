use crate::systems::state::SceneState;

/// Receives scene notifications after each tick.
///
/// Every method defaults to doing nothing, so observers only implement what they show.
/// The scene holds its delegate weakly; once the last strong reference is dropped,
/// notifications are silently discarded.
pub trait SceneDelegate {
    fn did_update_score(&self, _score: f64) {}

    /// Called before the life count changes, with the new count.
    fn will_update_life_count(&self, _count: u8) {}

    fn did_update_remaining_fuel(&self, _fuel: f32) {}

    fn did_finish_game(&self, _score: f64) {}

    fn did_update_game_state(&self, _state: SceneState) {}
}
