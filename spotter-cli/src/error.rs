// ============================================================================
// spotter-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// This module provides error handling utilities for the CLI that integrate
// with the spotter-core error types while adding CLI-specific error contexts.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - CliErrorContext: Context helpers for results and options
//
// AI-ASSISTANT-INFO: CLI error handling utilities

// ---- Internal crate imports ----
use spotter_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

// ============================================================================
// ERROR CONVERSION UTILITIES
// ============================================================================

/// Extension trait for adding context to errors in the CLI.
///
/// Configuration errors keep their variant so callers can still tell a bad
/// setup from a runtime failure; everything else becomes `OperationFailed`.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

fn with_context(context: impl fmt::Display, error: CoreError) -> CoreError {
    match error {
        CoreError::Config(message) => CoreError::Config(format!("{}: {}", context, message)),
        other => CoreError::OperationFailed(format!("{}: {}", context, other)),
    }
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| with_context(context, e.into()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| with_context(f(), e.into()))
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::Config(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::Config(f().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_config_variant() {
        let result: Result<(), CoreError> = Err(CoreError::Config("bad focal length".into()));
        let err = result.cli_context("Loading settings").unwrap_err();
        assert!(matches!(err, CoreError::Config(ref m) if m == "Loading settings: bad focal length"));
    }

    #[test]
    fn test_io_errors_become_operation_failures() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.cli_with_context(|| "Creating log dir").unwrap_err();
        assert!(matches!(err, CoreError::OperationFailed(_)));
    }

    #[test]
    fn test_missing_option_is_config_error() {
        let value: Option<u8> = None;
        assert!(matches!(value.cli_context("--email-to is required"), Err(CoreError::Config(_))));
    }
}
