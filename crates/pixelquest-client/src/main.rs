mod input;
mod logging;
mod render;
mod theme;

use std::error::Error;
use std::io::{BufWriter, Write, stdout};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use crossterm::{
    ExecutableCommand, cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal,
};

use pixelquest_core::game_trait::Game;
use pixelquest_platformer::Session;
use pixelquest_platformer::config::PlatformerConfig;

use input::{KeyAction, KeyTracker};
use render::Canvas;
use theme::Theme;

fn main() -> Result<(), Box<dyn Error>> {
    let _guard = logging::init_logging();

    let config = PlatformerConfig::load();
    config.validate()?;
    let theme = Theme::load()?;

    let mut session = Session::new(config);
    let meta = session.metadata();
    tracing::info!(name = %meta.name, tick_rate = session.tick_rate(), "Starting");

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(terminal::SetTitle(&meta.name))?;

    // Release events where the terminal supports them; others fall back to
    // the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = run(&mut out, &mut session, &theme, &rx);

    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    match &result {
        Ok(()) => tracing::info!(score = session.player().score, "Exited"),
        Err(e) => tracing::error!("Frame loop failed: {e}"),
    }
    result.map_err(Into::into)
}

/// Fixed-rate frame loop: drain keys, advance one tick, draw, sleep out the
/// rest of the frame.
fn run<W: Write>(
    out: &mut W,
    session: &mut Session,
    theme: &Theme,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let mut keys = KeyTracker::new();
    let frame = session.frame_duration();

    while !session.is_finished() {
        let frame_start = Instant::now();

        while let Ok(ev) = rx.try_recv() {
            let Event::Key(key) = ev else {
                continue;
            };
            if keys.record(key) == KeyAction::Quit {
                session.quit();
            }
        }
        if session.is_finished() {
            break;
        }

        for event in session.update(&keys.sample()) {
            tracing::debug!(?event, "Game event");
        }

        let (cols, rows) = terminal::size()?;
        let mut canvas = Canvas::new(cols, rows);
        render::draw(&mut canvas, session, theme);
        canvas.present(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    }
    Ok(())
}
