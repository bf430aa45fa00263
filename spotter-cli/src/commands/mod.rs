//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. The
//! configuration layering they share lives here.

/// Module containing the implementation of the `check` command.
pub mod check;
/// Module containing the implementation of the `watch` command.
/// This command runs the detection loop and raises alerts.
pub mod watch;

use log::debug;
use spotter_core::{ClassVocabulary, CoreConfig, CoreConfigBuilder};

use crate::cli::DetectionArgs;
use crate::error::{CliErrorContext, CliResult};

/// Effective configuration and the class vocabulary it was validated against.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: CoreConfig,
    pub vocabulary: Option<ClassVocabulary>,
}

/// Layers defaults, the optional JSON file and explicit flags, then validates.
pub fn resolve_config(args: &DetectionArgs) -> CliResult<ResolvedConfig> {
    let base = match &args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            CoreConfig::from_json_file(path)?
        }
        None => CoreConfig::default(),
    };

    let mut builder = CoreConfigBuilder::from_config(base);
    if let Some(label) = &args.target_label {
        builder = builder.target_label(label.as_str());
    }
    if let Some(value) = args.confidence {
        builder = builder.confidence_threshold(value);
    }
    if let Some(value) = args.overlap {
        builder = builder.overlap_suppression_threshold(value);
    }
    if let Some(value) = args.reference_width {
        builder = builder.known_reference_width_cm(value);
    }
    if let Some(value) = args.focal_length {
        builder = builder.focal_length_px(value);
    }
    if let Some(value) = args.cooldown {
        builder = builder.cooldown_seconds(value);
    }
    if let Some(scope) = args.cooldown_scope {
        builder = builder.cooldown_scope(scope);
    }
    if let Some(policy) = args.selection {
        builder = builder.selection_policy(policy);
    }
    if let Some(workers) = args.workers {
        builder = builder.dispatch_workers(workers);
    }
    let config = builder.build();

    let vocabulary = match &args.vocabulary {
        Some(path) => {
            let vocabulary = ClassVocabulary::from_file(path)?;
            config
                .validate_against(&vocabulary)
                .cli_with_context(|| format!("Checking against {}", path.display()))?;
            Some(vocabulary)
        }
        None => {
            config.validate()?;
            None
        }
    };

    Ok(ResolvedConfig { config, vocabulary })
}
