//! Configuration structures and constants for the spotter-core library.
//!
//! This module provides the configuration for the alerting pipeline: which
//! class to watch for, the detector thresholds, the distance calibration and
//! the cooldown policy.

mod builder;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cooldown::CooldownScope;
use crate::detection::{ClassVocabulary, SelectionPolicy};
use crate::error::{CoreError, CoreResult};

pub use builder::CoreConfigBuilder;

// Default constants

/// Default class label to watch for.
pub const DEFAULT_TARGET_LABEL: &str = "cell phone";

/// Default minimum detector confidence for a detection to be considered.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.55;

/// Default IoU above which overlapping boxes of one class are suppressed.
pub const DEFAULT_OVERLAP_SUPPRESSION_THRESHOLD: f32 = 0.2;

/// Default real-world width of the target object in centimeters.
/// 7.0 cm is the width of a typical phone.
pub const DEFAULT_REFERENCE_WIDTH_CM: f32 = 7.0;

/// Default focal length in pixels, calibrated for a 640x480 webcam.
pub const DEFAULT_FOCAL_LENGTH_PX: f32 = 615.0;

/// Default minimum time between alert rounds, in seconds.
pub const DEFAULT_COOLDOWN_SECONDS: f32 = 30.0;

/// Default number of worker threads used for notification dispatch.
pub const DEFAULT_DISPATCH_WORKERS: usize = 4;

/// Main configuration structure for the spotter-core library.
///
/// All fields have defaults; a JSON configuration file only needs to list
/// the values it overrides.
///
/// # Examples
///
/// ```rust
/// use spotter_core::config::CoreConfigBuilder;
/// use spotter_core::cooldown::CooldownScope;
///
/// let config = CoreConfigBuilder::new()
///     .target_label("cell phone")
///     .cooldown_seconds(30.0)
///     .cooldown_scope(CooldownScope::Global)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Class label that triggers alerts
    pub target_label: String,

    /// Minimum detector confidence (0.0-1.0)
    pub confidence_threshold: f32,

    /// IoU threshold for non-max suppression (0.0-1.0)
    pub overlap_suppression_threshold: f32,

    /// Known real-world width of the target in centimeters
    pub known_reference_width_cm: f32,

    /// Calibrated camera focal length in pixels
    pub focal_length_px: f32,

    /// Minimum interval between alert rounds in seconds
    pub cooldown_seconds: f32,

    /// Whether the cooldown re-arms at each new episode
    pub cooldown_scope: CooldownScope,

    /// Which detection drives alerting when several match
    pub selection_policy: SelectionPolicy,

    /// Worker threads for notification dispatch
    pub dispatch_workers: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            target_label: DEFAULT_TARGET_LABEL.to_string(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            overlap_suppression_threshold: DEFAULT_OVERLAP_SUPPRESSION_THRESHOLD,
            known_reference_width_cm: DEFAULT_REFERENCE_WIDTH_CM,
            focal_length_px: DEFAULT_FOCAL_LENGTH_PX,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            cooldown_scope: CooldownScope::default(),
            selection_policy: SelectionPolicy::default(),
            dispatch_workers: DEFAULT_DISPATCH_WORKERS,
        }
    }
}

impl CoreConfig {
    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            CoreError::Config(format!(
                "Failed to parse configuration file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// The cooldown as a `Duration`.
    ///
    /// Fails for negative, non-finite or out-of-range values.
    pub fn cooldown(&self) -> CoreResult<Duration> {
        Duration::try_from_secs_f32(self.cooldown_seconds).map_err(|_| {
            CoreError::Config(format!(
                "cooldown must be a non-negative number of seconds, got {}",
                self.cooldown_seconds
            ))
        })
    }

    /// Checks every option for internal consistency.
    pub fn validate(&self) -> CoreResult<()> {
        if self.target_label.trim().is_empty() {
            return Err(CoreError::Config("target label must not be empty".to_string()));
        }
        check_unit_interval("confidence threshold", self.confidence_threshold)?;
        check_unit_interval(
            "overlap suppression threshold",
            self.overlap_suppression_threshold,
        )?;
        check_positive("known reference width", self.known_reference_width_cm)?;
        check_positive("focal length", self.focal_length_px)?;
        self.cooldown()?;
        if self.dispatch_workers == 0 {
            return Err(CoreError::Config(
                "at least one dispatch worker is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Validates the configuration and checks that the detector can actually
    /// produce the target label.
    pub fn validate_against(&self, vocabulary: &ClassVocabulary) -> CoreResult<()> {
        self.validate()?;
        if !vocabulary.contains(&self.target_label) {
            return Err(CoreError::Config(format!(
                "target label '{}' is not in the class vocabulary ({} labels)",
                self.target_label,
                vocabulary.len()
            )));
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f32) -> CoreResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Config(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f32) -> CoreResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Config(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cooldown().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let cases = [
            CoreConfig { target_label: "  ".into(), ..Default::default() },
            CoreConfig { confidence_threshold: 1.2, ..Default::default() },
            CoreConfig { overlap_suppression_threshold: -0.1, ..Default::default() },
            CoreConfig { focal_length_px: 0.0, ..Default::default() },
            CoreConfig { known_reference_width_cm: f32::NAN, ..Default::default() },
            CoreConfig { cooldown_seconds: -1.0, ..Default::default() },
            CoreConfig { cooldown_seconds: f32::INFINITY, ..Default::default() },
            CoreConfig { cooldown_seconds: 1e20, ..Default::default() },
            CoreConfig { dispatch_workers: 0, ..Default::default() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(CoreError::Config(_))),
                "expected config error for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_target_label_must_be_in_vocabulary() {
        let vocabulary = ClassVocabulary::from_labels(["person", "cell phone"]);
        assert!(CoreConfig::default().validate_against(&vocabulary).is_ok());

        let config = CoreConfig { target_label: "mobile".into(), ..Default::default() };
        let err = config.validate_against(&vocabulary).unwrap_err();
        assert!(err.to_string().contains("not in the class vocabulary"));
    }

    #[test]
    fn test_partial_json_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spotter.json");
        std::fs::write(
            &path,
            r#"{ "target_label": "remote", "cooldown_scope": "global", "selection_policy": "nearest" }"#,
        )
        .unwrap();

        let config = CoreConfig::from_json_file(&path).unwrap();
        assert_eq!(config.target_label, "remote");
        assert_eq!(config.cooldown_scope, CooldownScope::Global);
        assert_eq!(config.selection_policy, SelectionPolicy::Nearest);
        assert_eq!(config.focal_length_px, DEFAULT_FOCAL_LENGTH_PX);
    }

    #[test]
    fn test_malformed_json_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ target_label: ").unwrap();
        assert!(matches!(
            CoreConfig::from_json_file(&path),
            Err(CoreError::Config(_))
        ));
    }
}
