use std::path::Path;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{
    filter::Targets,
    fmt::{
        self,
        format::{Format, Full},
        time::SystemTime,
    },
    prelude::*,
};

fn build_base_log_format() -> Format<Full, SystemTime> {
    fmt::format()
        .with_level(true)
        .with_ansi(false)
        .with_target(true)
}

fn targets(level: Level) -> Targets {
    Targets::new()
        .with_target("rusqlite", Level::WARN)
        .with_default(level)
}

pub fn parse_level(level: &str) -> Level {
    Level::from_str(level).unwrap_or(Level::INFO)
}

/// Install the global subscriber: events at `console_level` and above on
/// stderr and, when `log_dir` is given, events at `file_level` and above in
/// a daily-rolling file under it.
///
/// Returns `false` if a subscriber was already installed.
pub fn setup_logging(console_level: Level, file_level: Level, log_dir: Option<&Path>) -> bool {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(build_base_log_format().with_ansi(true))
        .with_writer(std::io::stderr)
        .with_filter(targets(console_level));

    let file_layer = log_dir.map(|dir| {
        tracing_subscriber::fmt::layer()
            .event_format(build_base_log_format())
            .with_writer(tracing_appender::rolling::daily(dir, "cadence.log"))
            .with_filter(targets(file_level))
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
}
