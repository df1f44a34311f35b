pub mod error;
pub mod events;
pub mod game_trait;
pub mod geometry;
pub mod input;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::events::GameEvent;
    use crate::game_trait::Game;
    use crate::input::FrameInput;

    /// Input with only `confirm` pressed.
    pub fn confirm() -> FrameInput {
        FrameInput {
            confirm: true,
            ..Default::default()
        }
    }

    /// Input with only `cancel` pressed.
    pub fn cancel() -> FrameInput {
        FrameInput {
            cancel: true,
            ..Default::default()
        }
    }

    /// Run N ticks with the same input, returning all accumulated events.
    pub fn run_game_ticks(game: &mut dyn Game, n: usize, input: &FrameInput) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(input));
        }
        all_events
    }

    /// Count the events matching `pred`.
    pub fn count_events(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Generic checks every `Game` implementation must pass. Game crates
    // call them from their own test modules with a fresh instance.

    /// A fresh game left idle must keep running.
    pub fn contract_idle_game_keeps_running(game: &mut dyn Game, ticks: usize) {
        run_game_ticks(game, ticks, &FrameInput::default());
        assert!(
            !game.is_finished(),
            "idle game must not finish on its own after {ticks} ticks"
        );
    }

    /// Cancel on the starting screen must end the session.
    pub fn contract_cancel_on_start_screen_quits(game: &mut dyn Game) {
        let events = game.update(&cancel());
        assert!(game.is_finished(), "cancel on the start screen must quit");
        assert!(
            events.contains(&GameEvent::QuitRequested),
            "quitting must be reported as an event"
        );
    }

    /// Once finished, update() must be a no-op.
    pub fn contract_finished_game_is_inert(game: &mut dyn Game) {
        assert!(game.is_finished(), "precondition: game must be finished");
        let events = run_game_ticks(game, 10, &confirm());
        assert!(events.is_empty(), "finished game must not emit events");
        assert!(game.is_finished());
    }

    /// The tick rate must give a positive, finite frame budget.
    pub fn contract_tick_rate_is_sane(game: &dyn Game) {
        let rate = game.tick_rate();
        assert!(rate.is_finite() && rate > 0.0, "tick rate {rate} must be > 0");
        assert!(!game.frame_duration().is_zero());
    }
}
