//! File logging for the terminal frontend.
//!
//! The terminal runs in raw mode with an alternate screen, so nothing goes to
//! stdout. Logs land in `logs/pixelquest.log.<date>` instead.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

pub fn logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Install the global subscriber. Keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init_logging() -> WorkerGuard {
    let dir = logs_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: Failed to create logs directory: {e}");
    }

    let appender = RollingFileAppender::new(Rotation::DAILY, &dir, "pixelquest.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    guard
}
