// ============================================================================
// spotter-core/src/notifications/ntfy.rs
// ============================================================================
//
// NTFY CHANNEL: Mobile Push Alerts Through ntfy
//
// Delivers alert jobs as push notifications to an ntfy topic. Used as the
// mobile text channel when no SMS provider is configured, and usable for any
// other channel slot.
//
// KEY COMPONENTS:
// - NtfyAlertChannel: AlertChannel posting to one ntfy topic
//
// AI-ASSISTANT-INFO: ntfy push implementation of AlertChannel

// ---- External crate imports ----
use ntfy::DispatcherBuilder;
use ntfy::payload::{Payload, Priority as NtfyPriority};
use url::Url;

// ---- Internal crate imports ----
use super::abstraction::{AlertChannel, NotificationJob};
use crate::error::{CoreError, CoreResult};

/// Sends alert jobs to an ntfy topic.
///
/// # Examples
///
/// ```rust,no_run
/// use spotter_core::cooldown::AlertAction;
/// use spotter_core::notifications::{AlertChannel, NotificationJob, NtfyAlertChannel};
///
/// let channel = NtfyAlertChannel::new("sms", "https://ntfy.sh/desk-watch").unwrap();
/// let job = NotificationJob::new(AlertAction::Sms, "cell phone", 48.5, 120);
/// channel.deliver(&job).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct NtfyAlertChannel {
    name: String,
    topic_url: String,
    base_url: String,
    topic: String,
}

impl NtfyAlertChannel {
    /// Creates a channel for a full topic URL such as `https://ntfy.sh/topic`.
    ///
    /// # Returns
    ///
    /// * `Ok(NtfyAlertChannel)` - If the URL has a host and a topic path
    /// * `Err(CoreError::Config)` - If the URL is malformed
    pub fn new(name: impl Into<String>, topic_url: &str) -> CoreResult<Self> {
        let parsed = Url::parse(topic_url).map_err(|e| {
            CoreError::Config(format!("Invalid ntfy topic URL '{}': {}", topic_url, e))
        })?;

        let host = match parsed.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Err(CoreError::Config(format!(
                    "URL '{}' must have a non-empty host",
                    topic_url
                )));
            }
        };
        let base_url = match parsed.port() {
            Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
            None => format!("{}://{}", parsed.scheme(), host),
        };

        let topic = parsed.path().trim_matches('/');
        if topic.is_empty() {
            return Err(CoreError::Config(format!(
                "URL '{}' is missing topic path",
                topic_url
            )));
        }

        Ok(Self {
            name: name.into(),
            topic_url: topic_url.to_string(),
            base_url,
            topic: topic.to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl AlertChannel for NtfyAlertChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, job: &NotificationJob) -> CoreResult<()> {
        let dispatcher = DispatcherBuilder::new(&self.base_url)
            .build_blocking()
            .map_err(|e| {
                CoreError::channel(
                    &self.name,
                    format!("failed to build ntfy dispatcher for {}: {}", self.base_url, e),
                )
            })?;

        let payload = Payload::new(&self.topic)
            .message(job.get_message())
            .title(job.get_title())
            .priority(map_priority(job.get_priority()))
            .tags(vec![
                "spotter".to_string(),
                "warning".to_string(),
                job.kind.as_str().to_string(),
            ]);

        dispatcher.send(&payload).map_err(|e| {
            CoreError::channel(
                &self.name,
                format!("ntfy post to {} failed: {}", self.topic_url, e),
            )
        })
    }
}

/// Maps a 1-5 job priority to ntfy's levels.
fn map_priority(p: u8) -> NtfyPriority {
    match p {
        0 | 1 => NtfyPriority::Min,
        2 => NtfyPriority::Low,
        3 => NtfyPriority::Default,
        4 => NtfyPriority::High,
        _ => NtfyPriority::Max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_url_is_split() {
        let channel = NtfyAlertChannel::new("sms", "https://ntfy.example.com:8443/desk-watch").unwrap();
        assert_eq!(channel.base_url, "https://ntfy.example.com:8443");
        assert_eq!(channel.topic(), "desk-watch");
        assert_eq!(channel.name(), "sms");
    }

    #[test]
    fn test_invalid_topic_urls_are_config_errors() {
        for url in ["not a url", "https://ntfy.sh", "https://ntfy.sh/"] {
            assert!(
                matches!(NtfyAlertChannel::new("sms", url), Err(CoreError::Config(_))),
                "{} should be rejected",
                url
            );
        }
    }
}
