// spotter-cli/src/main.rs
//
// Entry point for the `spotter` binary.
//
// Responsibilities include:
// - Parsing command-line arguments with clap.
// - Setting up logging to the console and, for `watch`, a per-run log file.
// - Dispatching to the command implementations in `spotter_cli::commands`.
// - Mapping errors to a message on stderr and exit code 1.

use clap::Parser;
use std::fs;
use std::process;

use spotter_cli::commands::check::run_check;
use spotter_cli::commands::watch::run_watch;
use spotter_cli::error::{CliErrorContext, CliResult};
use spotter_cli::logging::{effective_level, get_timestamp, setup_logging};
use spotter_cli::{Cli, Commands};
use spotter_core::CoreError;

fn run(cli: Cli) -> CliResult<()> {
    let level = effective_level(cli.verbose, cli.log_level);

    match cli.command {
        Commands::Watch(args) => {
            fs::create_dir_all(&args.log_dir).cli_with_context(|| {
                format!("Failed to create log directory {}", args.log_dir.display())
            })?;
            let log_path = args
                .log_dir
                .join(format!("spotter_watch_{}.log", get_timestamp()));
            setup_logging(level, Some(&log_path))?;
            log::info!("Run log: {}", log_path.display());

            let summary = run_watch(args)?;
            let json = serde_json::to_string_pretty(&summary).map_err(CoreError::from)?;
            println!("{}", json);
            Ok(())
        }
        Commands::Check(args) => {
            setup_logging(level, None)?;
            run_check(args)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
