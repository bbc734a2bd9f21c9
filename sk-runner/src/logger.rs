use crate::error::{Result as RunnerResult, RunnerError};

use sk_config::LogLevel;

use std::fmt::Display;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{Record, info};

fn write_line(out: FormatCallback, message: &std::fmt::Arguments, record: &Record, level: &dyn Display) {
    out.finish(format_args!(
        "[{date} - {level}] [{target}] {message}",
        date = humantime::format_rfc3339(SystemTime::now()),
        level = level,
        target = record.target(),
        message = message,
    ))
}

/// Initialize logger with fern
///
/// # Arguments
/// * `log_level` - Log level filter
/// * `log_file` - Optional path to log file. None = stdout, Some = file output
/// * `colored` - Enable colored output (ignored when logging to file)
#[track_caller]
pub fn initialize(
    log_level: LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> RunnerResult<()> {
    let level_filter = log_level.0;

    let dispatch = if let Some(ref log_path) = log_file {
        let file = fern::log_file(log_path).map_err(|e| {
            RunnerError::logger(format!(
                "Failed to open log file {}: {e}",
                log_path.display()
            ))
        })?;

        Dispatch::new()
            .format(|out, message, record| write_line(out, message, record, &record.level()))
            .chain(file)
    } else if colored {
        let colors = ColoredLevelConfig::new()
            .trace(Color::Magenta)
            .debug(Color::Blue)
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red);

        Dispatch::new()
            .format(move |out, message, record| {
                write_line(out, message, record, &colors.color(record.level()))
            })
            .chain(std::io::stdout())
    } else {
        // Plain output for CI logs
        Dispatch::new()
            .format(|out, message, record| write_line(out, message, record, &record.level()))
            .chain(std::io::stdout())
    };

    Dispatch::new()
        .level(level_filter)
        .chain(dispatch)
        .apply()
        .map_err(|e| RunnerError::logger(e.to_string()))?;

    match log_file {
        Some(path) => info!(
            "Logger initialized: level={:?}, file={}",
            level_filter,
            path.display()
        ),
        None => info!("Logger initialized: level={:?}, stdout", level_filter),
    }

    Ok(())
}
