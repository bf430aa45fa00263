// ============================================================================
// spotter-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and File Log Dispatch
//
// The core library logs through the `log` facade only. This module installs
// the `fern` backend for the CLI: colored levels on stderr and, for long
// running commands, a plain per-run log file.
//
// KEY COMPONENTS:
// - Level selection from --verbose / --log-level
// - Console and file dispatch setup
// - Timestamp generation for log file names
//
// AI-ASSISTANT-INFO: Logging setup and helper functions

// ---- External crate imports ----
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

// ---- Standard library imports ----
use std::path::Path;

// ---- Internal crate imports ----
use crate::error::{CliErrorContext, CliResult};
use spotter_core::CoreError;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("spotter_watch_{}.log", spotter_cli::logging::get_timestamp());
/// assert!(log_filename.starts_with("spotter_watch_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Picks the log level: an explicit level wins, then --verbose, then Info.
pub fn effective_level(verbose: bool, forced: Option<LevelFilter>) -> LevelFilter {
    match forced {
        Some(level) => level,
        None if verbose => LevelFilter::Debug,
        None => LevelFilter::Info,
    }
}

/// Installs the global logger.
///
/// Console output goes to stderr so stdout stays free for command output.
/// When `log_file` is given, every record is also appended to it without
/// colors.
pub fn setup_logging(level: LevelFilter, log_file: Option<&Path>) -> CliResult<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        // Keep HTTP client chatter out of debug output.
        .level_for("ureq", LevelFilter::Warn)
        .level_for("rustls", LevelFilter::Warn)
        .chain(console);

    if let Some(path) = log_file {
        let file = fern::log_file(path)
            .cli_with_context(|| format!("Failed to create log file {}", path.display()))?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "[{} {} {}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    dispatch
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {}", e)))
}
