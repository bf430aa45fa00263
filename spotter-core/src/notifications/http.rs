// spotter-core/src/notifications/http.rs
//
// Shared error mapping for the HTTP-backed alert channels.

use crate::error::CoreError;

/// Longest slice of a provider error body kept in the error message.
const MAX_BODY_CHARS: usize = 200;

/// Converts a ureq failure into a channel delivery error.
pub(crate) fn map_http_error(channel: &str, error: ureq::Error) -> CoreError {
    match error {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let body: String = body.trim().chars().take(MAX_BODY_CHARS).collect();
            CoreError::channel(channel, format!("provider returned HTTP {}: {}", code, body))
        }
        ureq::Error::Transport(transport) => {
            CoreError::channel(channel, format!("request failed: {}", transport))
        }
    }
}
