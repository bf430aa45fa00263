// ============================================================================
// spotter-core/src/notifications/email.rs
// ============================================================================
//
// EMAIL CHANNEL: Alert Emails Through the SendGrid v3 Mail API
//
// Sends one plain-text email per job. The request is blocking and runs on a
// dispatcher worker.
//
// KEY COMPONENTS:
// - SendGridEmailConfig: API key and addresses
// - SendGridEmailChannel: AlertChannel sending emails
//
// AI-ASSISTANT-INFO: Email implementation of AlertChannel

// ---- Standard library imports ----
use std::time::Duration;

// ---- External crate imports ----
use log::debug;
use serde_json::{Value, json};

// ---- Internal crate imports ----
use super::abstraction::{AlertChannel, NotificationJob};
use super::http::map_http_error;
use crate::error::{CoreError, CoreResult};

pub const DEFAULT_SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// API key and addresses for the email provider.
#[derive(Debug, Clone)]
pub struct SendGridEmailConfig {
    pub api_key: String,
    pub from_address: String,
    pub to_address: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl SendGridEmailConfig {
    pub fn new(
        api_key: impl Into<String>,
        from_address: impl Into<String>,
        to_address: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            from_address: from_address.into(),
            to_address: to_address.into(),
            api_base: DEFAULT_SENDGRID_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Sends alert jobs as emails.
pub struct SendGridEmailChannel {
    config: SendGridEmailConfig,
    agent: ureq::Agent,
}

impl SendGridEmailChannel {
    pub fn new(config: SendGridEmailConfig) -> CoreResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(CoreError::Config("Email API key must not be empty".to_string()));
        }
        for address in [&config.from_address, &config.to_address] {
            if !address.contains('@') {
                return Err(CoreError::Config(format!(
                    "Invalid email address '{}'",
                    address
                )));
            }
        }
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Ok(Self { config, agent })
    }

    fn request_body(&self, job: &NotificationJob) -> Value {
        json!({
            "personalizations": [{ "to": [{ "email": self.config.to_address }] }],
            "from": { "email": self.config.from_address },
            "subject": job.get_title(),
            "content": [{ "type": "text/plain", "value": job.get_message() }],
        })
    }
}

impl AlertChannel for SendGridEmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    fn deliver(&self, job: &NotificationJob) -> CoreResult<()> {
        let url = format!("{}/v3/mail/send", self.config.api_base.trim_end_matches('/'));
        debug!("Posting email to {} for frame {}", self.config.to_address, job.frame_index);

        self.agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(self.request_body(job))
            .map_err(|e| map_http_error(self.name(), e))?;
        Ok(())
    }
}
