// spotter-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use spotter_core::{CooldownScope, SelectionPolicy};
use std::path::PathBuf;

use crate::config::{
    DEFAULT_DRAIN_TIMEOUT_SECS, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_LOG_DIR,
};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Spotter: real-time object spotting and alerting",
    long_about = "Watches detections for a target object, estimates its distance and raises \
                  alarm, email, SMS and log alerts via the spotter-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Force a log level (off, error, warn, info, debug, trace); overrides --verbose
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        env = "SPOTTER_LOG_LEVEL",
        value_parser = parse_level
    )]
    pub log_level: Option<LevelFilter>,
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("unknown log level '{}'", value))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs the detection loop over a detection recording and raises alerts
    Watch(WatchArgs),
    /// Validates the effective configuration and prints it as JSON
    Check(CheckArgs),
}

/// Options shared by every command that builds a detection configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct DetectionArgs {
    /// Optional: JSON configuration file; explicit flags override its values
    #[arg(short, long, value_name = "FILE", env = "SPOTTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Class label that triggers alerts (default: "cell phone")
    #[arg(long, value_name = "LABEL")]
    pub target_label: Option<String>,

    /// Minimum detector confidence, 0.0-1.0 (default: 0.55)
    #[arg(long, value_name = "FLOAT")]
    pub confidence: Option<f32>,

    /// IoU threshold for non-max suppression, 0.0-1.0 (default: 0.2)
    #[arg(long, value_name = "FLOAT")]
    pub overlap: Option<f32>,

    /// Real-world width of the target object in cm (default: 7.0)
    #[arg(long, value_name = "CM")]
    pub reference_width: Option<f32>,

    /// Calibrated camera focal length in pixels (default: 615)
    #[arg(long, value_name = "PX")]
    pub focal_length: Option<f32>,

    /// Minimum seconds between alert rounds (default: 30)
    #[arg(long, value_name = "SECONDS")]
    pub cooldown: Option<f32>,

    /// Cooldown scope: per-episode or global (default: per-episode)
    #[arg(long, value_name = "SCOPE")]
    pub cooldown_scope: Option<CooldownScope>,

    /// Detection selection: first, highest-confidence or nearest (default: highest-confidence)
    #[arg(long, value_name = "POLICY")]
    pub selection: Option<SelectionPolicy>,

    /// Notification worker threads (default: 4)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Optional: class names file (one label per line) used to resolve class ids
    /// and to validate the target label
    #[arg(long, value_name = "FILE", env = "SPOTTER_VOCABULARY")]
    pub vocabulary: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub detection: DetectionArgs,

    /// Detection recording to replay (JSON Lines, one frame per line)
    #[arg(short, long, required = true, value_name = "FILE")]
    pub replay: PathBuf,

    /// Interval between recorded frames in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_FRAME_INTERVAL_MS)]
    pub frame_interval_ms: u64,

    /// Replay at recording speed instead of as fast as possible
    #[arg(long)]
    pub realtime: bool,

    /// Seconds to wait for in-flight notifications after the loop ends
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_DRAIN_TIMEOUT_SECS)]
    pub drain_timeout: f64,

    /// Directory for run log files
    #[arg(short, long, value_name = "LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Optional: alert log file (defaults to LOG_DIR/alerts.jsonl)
    #[arg(long, value_name = "FILE", env = "SPOTTER_ALERT_LOG")]
    pub alert_log: Option<PathBuf>,

    // --- Alarm ---
    /// Optional: sound file played on every frame the target is visible
    #[arg(long, value_name = "FILE", env = "SPOTTER_ALARM_SOUND")]
    pub alarm_sound: Option<PathBuf>,

    /// Optional: audio player program (defaults to afplay on macOS, aplay elsewhere)
    #[arg(long, value_name = "PROGRAM", env = "SPOTTER_ALARM_PLAYER")]
    pub alarm_player: Option<String>,

    /// Disable the audible alarm
    #[arg(long)]
    pub no_alarm: bool,

    // --- Email ---
    /// Optional: SendGrid API key; enables the email channel
    #[arg(long, value_name = "KEY", env = "SPOTTER_SENDGRID_API_KEY", hide_env_values = true)]
    pub sendgrid_api_key: Option<String>,

    /// Sender address for alert emails
    #[arg(long, value_name = "ADDRESS", env = "SPOTTER_EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Recipient address for alert emails
    #[arg(long, value_name = "ADDRESS", env = "SPOTTER_EMAIL_TO")]
    pub email_to: Option<String>,

    /// Optional: override the email API base URL
    #[arg(long, value_name = "URL", env = "SPOTTER_SENDGRID_API_BASE")]
    pub sendgrid_api_base: Option<String>,

    // --- SMS ---
    /// Optional: Twilio account SID; enables the SMS channel
    #[arg(long, value_name = "SID", env = "SPOTTER_TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,

    /// Twilio auth token
    #[arg(long, value_name = "TOKEN", env = "SPOTTER_TWILIO_AUTH_TOKEN", hide_env_values = true)]
    pub twilio_auth_token: Option<String>,

    /// Sender phone number for alert texts
    #[arg(long, value_name = "NUMBER", env = "SPOTTER_SMS_FROM")]
    pub sms_from: Option<String>,

    /// Recipient phone number for alert texts
    #[arg(long, value_name = "NUMBER", env = "SPOTTER_SMS_TO")]
    pub sms_to: Option<String>,

    /// Optional: override the SMS API base URL
    #[arg(long, value_name = "URL", env = "SPOTTER_TWILIO_API_BASE")]
    pub twilio_api_base: Option<String>,

    // --- Push ---
    /// Optional: ntfy topic URL used for mobile alerts when no SMS provider is set
    /// (e.g., https://ntfy.sh/your_topic)
    #[arg(long, value_name = "TOPIC_URL", env = "SPOTTER_NTFY_TOPIC")]
    pub ntfy: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub detection: DetectionArgs,
}
