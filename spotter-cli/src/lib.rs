// spotter-cli/src/lib.rs
//
// Library portion of the Spotter CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{CheckArgs, Cli, Commands, DetectionArgs, WatchArgs};
pub use commands::check::run_check;
pub use commands::watch::run_watch;
