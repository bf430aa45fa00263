//! Implementation of the 'check' subcommand.
//!
//! Resolves the configuration exactly as `watch` would and prints it, so a
//! deployment can be validated before the camera is pointed anywhere.

use log::info;

use crate::cli::CheckArgs;
use crate::commands::resolve_config;
use crate::error::CliResult;
use spotter_core::CoreError;

pub fn run_check(args: CheckArgs) -> CliResult<()> {
    let resolved = resolve_config(&args.detection)?;
    if let Some(vocabulary) = &resolved.vocabulary {
        info!(
            "Target '{}' found in vocabulary of {} labels",
            resolved.config.target_label,
            vocabulary.len()
        );
    }

    let json = serde_json::to_string_pretty(&resolved.config).map_err(CoreError::from)?;
    println!("{}", json);
    info!("Configuration is valid");
    Ok(())
}
