// ============================================================================
// spotter-core/src/notifications/sms.rs
// ============================================================================
//
// SMS CHANNEL: Text Message Alerts Through the Twilio REST API
//
// Posts one message per job to the provider's Messages endpoint with HTTP
// basic auth. The request is blocking and runs on a dispatcher worker.
//
// KEY COMPONENTS:
// - TwilioSmsConfig: Account credentials and phone numbers
// - TwilioSmsChannel: AlertChannel sending SMS messages
//
// AI-ASSISTANT-INFO: SMS implementation of AlertChannel

// ---- Standard library imports ----
use std::time::Duration;

// ---- External crate imports ----
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;

// ---- Internal crate imports ----
use super::abstraction::{AlertChannel, NotificationJob};
use super::http::map_http_error;
use crate::error::{CoreError, CoreResult};

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Credentials and numbers for the SMS provider.
#[derive(Debug, Clone)]
pub struct TwilioSmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl TwilioSmsConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
        to_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            to_number: to_number.into(),
            api_base: DEFAULT_TWILIO_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        let required = [
            ("account SID", &self.account_sid),
            ("auth token", &self.auth_token),
            ("sender number", &self.from_number),
            ("recipient number", &self.to_number),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("SMS {} must not be empty", field)));
            }
        }
        Ok(())
    }
}

/// Sends alert jobs as SMS messages.
pub struct TwilioSmsChannel {
    config: TwilioSmsConfig,
    agent: ureq::Agent,
}

impl TwilioSmsChannel {
    pub fn new(config: TwilioSmsConfig) -> CoreResult<Self> {
        config.validate()?;
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Ok(Self { config, agent })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.account_sid, self.config.auth_token);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

impl AlertChannel for TwilioSmsChannel {
    fn name(&self) -> &str {
        "sms"
    }

    fn deliver(&self, job: &NotificationJob) -> CoreResult<()> {
        let body = job.get_message();
        debug!("Posting SMS to {} for frame {}", self.config.to_number, job.frame_index);

        self.agent
            .post(&self.messages_url())
            .set("Authorization", &self.authorization())
            .send_form(&[
                ("To", self.config.to_number.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", body.as_str()),
            ])
            .map_err(|e| map_http_error(self.name(), e))?;
        Ok(())
    }
}
