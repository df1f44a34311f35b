//! Keyboard state tracking: turns the terminal's key event stream into one
//! `FrameInput` per tick.
//!
//! Terminals with keyboard enhancement report press, repeat and release, so
//! held keys are dropped on release. Classic terminals only send repeated
//! presses while a key is down; there a key counts as held while its last
//! press arrived within `HOLD_WINDOW` frames.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use pixelquest_core::input::FrameInput;

/// Frames (at 60 Hz) a key stays held after its last press or repeat. OS key
/// repeat runs at 15 Hz or faster, so the window is refreshed before expiry.
pub const HOLD_WINDOW: u64 = 8;

const LEFT_KEYS: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a')];
const RIGHT_KEYS: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d')];
const JUMP_KEYS: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w')];

/// What the frame loop should do with a key beyond feeding it to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

#[derive(Debug, Default)]
pub struct KeyTracker {
    frame: u64,
    last_seen: HashMap<KeyCode, u64>,
    confirm: bool,
    cancel: bool,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: KeyEvent) -> KeyAction {
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Press => {
                if code == KeyCode::Char('q')
                    || (code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
                {
                    return KeyAction::Quit;
                }
                match code {
                    KeyCode::Enter => self.confirm = true,
                    KeyCode::Esc => self.cancel = true,
                    _ => {},
                }
                self.last_seen.insert(code, self.frame);
            },
            KeyEventKind::Repeat => {
                self.last_seen.insert(code, self.frame);
            },
            KeyEventKind::Release => {
                self.last_seen.remove(&code);
            },
        }
        KeyAction::Continue
    }

    /// Input for the current frame. Confirm and cancel fire once per press.
    pub fn sample(&mut self) -> FrameInput {
        let input = FrameInput {
            left: self.any_held(LEFT_KEYS),
            right: self.any_held(RIGHT_KEYS),
            jump: self.any_held(JUMP_KEYS),
            confirm: std::mem::take(&mut self.confirm),
            cancel: std::mem::take(&mut self.cancel),
        };
        self.frame += 1;
        input
    }

    fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|key| {
            self.last_seen
                .get(key)
                .is_some_and(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
        })
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
