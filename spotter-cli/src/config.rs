// spotter-cli/src/config.rs
//
// Defines default configuration constants for the `spotter-cli` application,
// primarily related to replay pacing and log placement.

pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 100;
pub const DEFAULT_DRAIN_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_ALERT_LOG_FILE: &str = "alerts.jsonl";
