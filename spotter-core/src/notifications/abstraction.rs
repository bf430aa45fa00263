// ============================================================================
// spotter-core/src/notifications/abstraction.rs
// ============================================================================
//
// NOTIFICATION ABSTRACTION: Alert Jobs and Channel Collaborators
//
// This module defines the unit of work handed to the dispatcher and the
// trait each alert channel implements, so the core can drive any email,
// SMS or log backend without knowing about it.
//
// KEY COMPONENTS:
// - NotificationJob: One alert side effect to perform
// - AlertChannel: Trait for delivering a job through one channel
// - NullAlertChannel: No-op implementation for unconfigured channels
// - AlertChannels: The email/SMS/log channel set used by the dispatcher
//
// AI-ASSISTANT-INFO: Notification job and channel abstractions

// ---- Standard library imports ----
use std::sync::Arc;

// ---- External crate imports ----
use chrono::{DateTime, Utc};
use serde::Serialize;

// ---- Internal crate imports ----
use crate::cooldown::AlertAction;
use crate::error::CoreResult;

// ============================================================================
// NOTIFICATION JOB
// ============================================================================

/// A single alert side effect, consumed exactly once and never retried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationJob {
    pub kind: AlertAction,
    pub target_label: String,
    pub distance_cm: f32,
    pub issued_at: DateTime<Utc>,
    pub frame_index: u64,
}

impl NotificationJob {
    /// Creates a job stamped with the current wall-clock time.
    pub fn new(kind: AlertAction, target_label: &str, distance_cm: f32, frame_index: u64) -> Self {
        Self {
            kind,
            target_label: target_label.to_string(),
            distance_cm,
            issued_at: Utc::now(),
            frame_index,
        }
    }

    /// Gets the title for this job.
    ///
    /// # Returns
    ///
    /// * A short headline suitable for an email subject or push title
    pub fn get_title(&self) -> String {
        format!("⚠️ {} Detected!", title_case(&self.target_label))
    }

    /// Gets the message body for this job.
    ///
    /// # Returns
    ///
    /// * The human-readable alert text for this job's channel
    pub fn get_message(&self) -> String {
        match self.kind {
            AlertAction::Email => format!(
                "A {} was detected at {:.2} cm distance.",
                self.target_label, self.distance_cm
            ),
            AlertAction::Sms => format!(
                "⚠️ {} detected! Distance: {:.2} cm",
                capitalize(&self.target_label),
                self.distance_cm
            ),
            AlertAction::Log | AlertAction::Alarm => format!(
                "{} detected at {:.2} cm",
                self.target_label, self.distance_cm
            ),
        }
    }

    /// Gets the priority level for this job.
    ///
    /// # Returns
    ///
    /// * A priority level (1-5, with 5 being highest)
    pub fn get_priority(&self) -> u8 {
        match self.kind {
            AlertAction::Sms | AlertAction::Alarm => 5,
            AlertAction::Email => 4,
            AlertAction::Log => 2,
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// ALERT CHANNEL
// ============================================================================

/// Trait for delivering alert jobs through one channel.
///
/// `deliver` runs on a dispatcher worker and may block on network or disk
/// I/O. Implementations report failures through the result; the dispatcher
/// logs them and moves on.
pub trait AlertChannel: Send + Sync {
    /// Short channel name used in logs ("email", "sms", "log").
    fn name(&self) -> &str;

    /// Delivers a job.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the job was delivered
    /// * `Err(CoreError)` - If delivery failed
    fn deliver(&self, job: &NotificationJob) -> CoreResult<()>;
}

/// No-op channel used when a channel is not configured.
#[derive(Debug, Clone)]
pub struct NullAlertChannel {
    name: String,
}

impl NullAlertChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AlertChannel for NullAlertChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, job: &NotificationJob) -> CoreResult<()> {
        log::debug!(
            "{} channel not configured, dropping alert for frame {}",
            self.name,
            job.frame_index
        );
        Ok(())
    }
}

// ============================================================================
// CHANNEL SET
// ============================================================================

/// Channels handling the notification kinds of an alert round.
#[derive(Clone)]
pub struct AlertChannels {
    pub email: Arc<dyn AlertChannel>,
    pub sms: Arc<dyn AlertChannel>,
    pub log: Arc<dyn AlertChannel>,
}

impl Default for AlertChannels {
    fn default() -> Self {
        Self {
            email: Arc::new(NullAlertChannel::new("email")),
            sms: Arc::new(NullAlertChannel::new("sms")),
            log: Arc::new(NullAlertChannel::new("log")),
        }
    }
}

impl AlertChannels {
    pub fn with_email(mut self, channel: Arc<dyn AlertChannel>) -> Self {
        self.email = channel;
        self
    }

    pub fn with_sms(mut self, channel: Arc<dyn AlertChannel>) -> Self {
        self.sms = channel;
        self
    }

    pub fn with_log(mut self, channel: Arc<dyn AlertChannel>) -> Self {
        self.log = channel;
        self
    }

    /// The channel for a job kind. The alarm has no channel; it is played by
    /// the alarm player.
    pub fn for_action(&self, action: AlertAction) -> Option<&Arc<dyn AlertChannel>> {
        match action {
            AlertAction::Email => Some(&self.email),
            AlertAction::Sms => Some(&self.sms),
            AlertAction::Log => Some(&self.log),
            AlertAction::Alarm => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_follow_channel() {
        let email = NotificationJob::new(AlertAction::Email, "cell phone", 42.123, 7);
        assert_eq!(email.get_title(), "⚠️ Cell Phone Detected!");
        assert_eq!(email.get_message(), "A cell phone was detected at 42.12 cm distance.");

        let sms = NotificationJob::new(AlertAction::Sms, "cell phone", 42.125, 7);
        assert!(sms.get_message().starts_with("⚠️ Cell phone detected! Distance: 42.1"));
        assert_eq!(sms.get_priority(), 5);
    }

    #[test]
    fn test_alarm_has_no_channel() {
        let channels = AlertChannels::default();
        assert!(channels.for_action(AlertAction::Alarm).is_none());
        assert_eq!(channels.for_action(AlertAction::Sms).map(|c| c.name()), Some("sms"));
    }
}
