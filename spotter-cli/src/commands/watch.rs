//! Implementation of the 'watch' subcommand.
//!
//! Wires a detection recording, the configured alert channels and the alarm
//! into the core detection loop, runs it until the recording ends or Ctrl+C
//! is pressed, then drains in-flight notifications and reports a summary.

use crate::cli::WatchArgs;
use crate::commands::{ResolvedConfig, resolve_config};
use crate::config::DEFAULT_ALERT_LOG_FILE;
use crate::error::{CliErrorContext, CliResult};

use spotter_core::notifications::{
    AlertChannels, JsonLinesAlertLog, NotificationDispatcher, NtfyAlertChannel,
    SendGridEmailChannel, SendGridEmailConfig, TwilioSmsChannel, TwilioSmsConfig,
};
use spotter_core::recording::{DetectionRecording, RecordedDetector, RecordedFrameSource};
use spotter_core::{
    AlarmPlayer, CommandAlarmSound, CoreError, DetectionLoop, LoopSummary, ShutdownHandle,
    ThresholdedDetector,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};

/// Builds the email, SMS and log channels from the command-line options.
///
/// Unconfigured channels fall back to no-op channels. For mobile alerts an
/// SMS provider takes precedence over an ntfy topic.
pub fn build_channels(args: &WatchArgs) -> CliResult<AlertChannels> {
    let mut channels = AlertChannels::default();

    if let Some(api_key) = &args.sendgrid_api_key {
        let from = args.email_from.as_deref().cli_context("--email-from is required for email alerts")?;
        let to = args.email_to.as_deref().cli_context("--email-to is required for email alerts")?;
        let mut config = SendGridEmailConfig::new(api_key.as_str(), from, to);
        if let Some(base) = &args.sendgrid_api_base {
            config.api_base = base.clone();
        }
        info!("Email alerts: {}", to);
        channels = channels.with_email(Arc::new(SendGridEmailChannel::new(config)?));
    }

    if let Some(sid) = &args.twilio_account_sid {
        let token = args
            .twilio_auth_token
            .as_deref()
            .cli_context("--twilio-auth-token is required for SMS alerts")?;
        let from = args.sms_from.as_deref().cli_context("--sms-from is required for SMS alerts")?;
        let to = args.sms_to.as_deref().cli_context("--sms-to is required for SMS alerts")?;
        let mut config = TwilioSmsConfig::new(sid.as_str(), token, from, to);
        if let Some(base) = &args.twilio_api_base {
            config.api_base = base.clone();
        }
        info!("SMS alerts: {}", to);
        channels = channels.with_sms(Arc::new(TwilioSmsChannel::new(config)?));
    } else if let Some(topic_url) = &args.ntfy {
        let channel = NtfyAlertChannel::new("sms", topic_url)?;
        info!("Mobile alerts via ntfy topic '{}'", channel.topic());
        channels = channels.with_sms(Arc::new(channel));
    }

    let log_path = args
        .alert_log
        .clone()
        .unwrap_or_else(|| args.log_dir.join(DEFAULT_ALERT_LOG_FILE));
    let alert_log = JsonLinesAlertLog::open(&log_path)
        .cli_with_context(|| format!("Failed to open alert log {}", log_path.display()))?;
    info!("Alert log: {}", log_path.display());
    channels = channels.with_log(Arc::new(alert_log));

    Ok(channels)
}

/// Builds the alarm player; a missing sound file or --no-alarm makes it silent.
pub fn build_alarm(args: &WatchArgs) -> CliResult<AlarmPlayer> {
    if args.no_alarm {
        info!("Alarm disabled");
        return Ok(AlarmPlayer::silent());
    }
    let Some(sound_file) = &args.alarm_sound else {
        info!("No alarm sound configured, alarm is silent");
        return Ok(AlarmPlayer::silent());
    };
    if !sound_file.is_file() {
        return Err(CoreError::Config(format!(
            "Alarm sound file '{}' does not exist",
            sound_file.display()
        )));
    }

    let sound = match &args.alarm_player {
        Some(player) => CommandAlarmSound::with_player(player.as_str(), Vec::new(), sound_file),
        None => CommandAlarmSound::new(sound_file),
    };
    info!("Alarm sound: {}", sound.sound_file().display());
    Ok(AlarmPlayer::new(Arc::new(sound)))
}

fn install_ctrlc_handler(shutdown: &ShutdownHandle) {
    let handle = shutdown.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        if handle.is_requested() {
            // Second Ctrl+C: give up on a graceful stop.
            std::process::exit(130);
        }
        handle.request();
    }) {
        warn!("Failed to install Ctrl+C handler: {}", err);
    }
}

fn log_summary(summary: &LoopSummary) {
    info!("Watch run finished");
    info!(
        "  Frames:        {} processed, {} skipped, {} detection errors",
        summary.frames_processed, summary.frames_skipped, summary.detection_errors
    );
    info!(
        "  Target frames: {} in {} episodes",
        summary.target_frames, summary.episodes
    );
    info!(
        "  Alert rounds:  {} (alarm requested {} times, started {})",
        summary.alert_rounds, summary.alarm_requests, summary.alarms_started
    );
    info!(
        "  Jobs:          {} email, {} sms, {} log",
        summary.email_jobs, summary.sms_jobs, summary.log_jobs
    );
}

/// Runs the `watch` command.
/// Converts `--drain-timeout` seconds into a `Duration`.
fn parse_drain_timeout(seconds: f64) -> CliResult<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        CoreError::Config(format!(
            "--drain-timeout must be a non-negative number of seconds, got {}",
            seconds
        ))
    })
}

pub fn run_watch(args: WatchArgs) -> CliResult<LoopSummary> {
    let started = Instant::now();
    let ResolvedConfig { config, vocabulary } = resolve_config(&args.detection)?;
    let drain_timeout = parse_drain_timeout(args.drain_timeout)?;

    let recording = Arc::new(
        DetectionRecording::from_file(&args.replay)
            .cli_with_context(|| format!("Invalid replay file {}", args.replay.display()))?,
    );
    info!(
        "Replaying {} frames from {}",
        recording.len(),
        args.replay.display()
    );

    let source = RecordedFrameSource::new(
        recording.clone(),
        Duration::from_millis(args.frame_interval_ms),
    )
    .realtime(args.realtime);
    let mut recorded_detector = RecordedDetector::new(recording);
    if let Some(vocabulary) = vocabulary {
        recorded_detector = recorded_detector.with_vocabulary(vocabulary);
    }
    let detector = ThresholdedDetector::new(
        recorded_detector,
        config.confidence_threshold,
        config.overlap_suppression_threshold,
    );

    let channels = build_channels(&args)?;
    let dispatcher = Arc::new(NotificationDispatcher::new(channels, config.dispatch_workers)?);
    let alarm = build_alarm(&args)?;

    let shutdown = ShutdownHandle::new();
    install_ctrlc_handler(&shutdown);

    let mut detection_loop = DetectionLoop::new(
        config,
        source,
        detector,
        alarm.clone(),
        dispatcher.clone(),
    )?
    .with_shutdown(shutdown);
    let summary = detection_loop.run();

    if !dispatcher.wait_idle(drain_timeout) {
        warn!(
            "{} notifications still pending after {:.1}s, abandoning them",
            dispatcher.pending(),
            drain_timeout.as_secs_f64()
        );
    }
    if !alarm.wait_idle(drain_timeout) {
        warn!("Alarm still playing after {:.1}s", drain_timeout.as_secs_f64());
    }

    let stats = dispatcher.stats();
    log_summary(&summary);
    info!(
        "  Deliveries:    {} succeeded, {} failed",
        stats.succeeded, stats.failed
    );
    info!("Total watch time: {:.1?}", started.elapsed());

    Ok(summary)
}
