// ============================================================================
// spotter-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Spotter Core Library
//
// This module defines the error type shared by every component of the core
// library, together with a classification that tells callers how an error
// must be handled: recovered locally, fatal at startup, or isolated to a
// single alert channel.
//
// KEY COMPONENTS:
// - CoreError: Enum of all errors raised by the core library
// - ErrorKind: Handling class of an error (transient, configuration, action)
// - CoreResult: Result alias used throughout the crate
//
// AI-ASSISTANT-INFO: Core error types and error classification

// ---- External crate imports ----
use thiserror::Error;

// ============================================================================
// ERROR CLASSIFICATION
// ============================================================================

/// How an error is expected to be handled by the detection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Frame acquisition or detector failure. The frame is skipped and the
    /// loop continues.
    TransientIo,

    /// Invalid configuration. Fatal, surfaced before the loop starts.
    Configuration,

    /// An alert side effect (email, SMS, log, alarm) failed. Logged and
    /// isolated to its channel, never retried.
    ActionFailure,
}

// ============================================================================
// CORE ERROR
// ============================================================================

/// Errors raised by the spotter core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Frame acquisition failed: {0}")]
    FrameAcquisition(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("{channel} delivery failed: {message}")]
    ChannelDelivery { channel: String, message: String },

    #[error("Alarm playback failed: {0}")]
    AlarmPlayback(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl CoreError {
    /// Shorthand for a channel delivery failure.
    pub fn channel(channel: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::ChannelDelivery {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Classifies the error according to how the loop must react to it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Config(_) => ErrorKind::Configuration,
            CoreError::ChannelDelivery { .. } | CoreError::AlarmPlayback(_) => {
                ErrorKind::ActionFailure
            }
            CoreError::Io(_)
            | CoreError::Json(_)
            | CoreError::FrameAcquisition(_)
            | CoreError::Detection(_)
            | CoreError::OperationFailed(_) => ErrorKind::TransientIo,
        }
    }
}

/// Result type for spotter core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_follow_taxonomy() {
        assert_eq!(
            CoreError::Config("missing label".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            CoreError::channel("email", "smtp down").kind(),
            ErrorKind::ActionFailure
        );
        assert_eq!(
            CoreError::AlarmPlayback("no device".into()).kind(),
            ErrorKind::ActionFailure
        );
        assert_eq!(
            CoreError::FrameAcquisition("camera busy".into()).kind(),
            ErrorKind::TransientIo
        );
    }

    #[test]
    fn test_channel_error_message() {
        let err = CoreError::channel("sms", "HTTP 401");
        assert_eq!(err.to_string(), "sms delivery failed: HTTP 401");
    }
}
