use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::input::FrameInput;

/// Core trait the frontend drives once per frame.
///
/// The frontend owns the window, the clock and the key state; the game only
/// advances its own simulation and reports what happened.
pub trait Game {
    /// Name and blurb for the title bar.
    fn metadata(&self) -> GameMetadata;

    /// Advance exactly one tick. Returns the events produced by that tick.
    fn update(&mut self, input: &FrameInput) -> Vec<GameEvent>;

    /// Whether the session has ended (quit or campaign won).
    fn is_finished(&self) -> bool;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Wall-clock budget of a single tick.
    fn frame_duration(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.tick_rate())
    }
}

/// Game metadata for the title bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
}
