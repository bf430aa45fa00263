// ============================================================================
// spotter-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// This module implements the builder pattern for the CoreConfig structure,
// providing a fluent API for creating and configuring CoreConfig instances
// on top of the library defaults.
//
// KEY COMPONENTS:
// - CoreConfigBuilder: Builder struct for creating CoreConfig instances
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CoreConfig

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::cooldown::CooldownScope;
use crate::detection::SelectionPolicy;

/// Builder for creating CoreConfig instances.
///
/// Starts from [`CoreConfig::default`] or from an existing configuration
/// (e.g. one loaded from a file) and overrides individual values.
///
/// # Examples
///
/// ```rust
/// use spotter_core::config::CoreConfigBuilder;
/// use spotter_core::detection::SelectionPolicy;
///
/// let config = CoreConfigBuilder::new()
///     .target_label("remote")
///     .confidence_threshold(0.6)
///     .known_reference_width_cm(4.5)
///     .focal_length_px(600.0)
///     .selection_policy(SelectionPolicy::Nearest)
///     .build();
/// assert_eq!(config.target_label, "remote");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder starting from an existing configuration.
    pub fn from_config(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Sets the class label that triggers alerts.
    pub fn target_label(mut self, label: impl Into<String>) -> Self {
        self.config.target_label = label.into();
        self
    }

    /// Sets the minimum detector confidence.
    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    /// Sets the IoU threshold used for non-max suppression.
    pub fn overlap_suppression_threshold(mut self, threshold: f32) -> Self {
        self.config.overlap_suppression_threshold = threshold;
        self
    }

    /// Sets the real-world width of the target object.
    pub fn known_reference_width_cm(mut self, width: f32) -> Self {
        self.config.known_reference_width_cm = width;
        self
    }

    /// Sets the calibrated focal length.
    pub fn focal_length_px(mut self, focal_length: f32) -> Self {
        self.config.focal_length_px = focal_length;
        self
    }

    /// Sets the minimum interval between alert rounds.
    pub fn cooldown_seconds(mut self, seconds: f32) -> Self {
        self.config.cooldown_seconds = seconds;
        self
    }

    /// Sets whether the cooldown re-arms at each new episode.
    pub fn cooldown_scope(mut self, scope: CooldownScope) -> Self {
        self.config.cooldown_scope = scope;
        self
    }

    /// Sets the policy choosing one detection per frame.
    pub fn selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.config.selection_policy = policy;
        self
    }

    /// Sets the number of notification dispatch workers.
    pub fn dispatch_workers(mut self, workers: usize) -> Self {
        self.config.dispatch_workers = workers;
        self
    }

    /// Builds the configuration. Call [`CoreConfig::validate`] before use.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
