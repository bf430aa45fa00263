//! Alert notifications: jobs, channels and the non-blocking dispatcher.
//!
//! An alert round produces one [`NotificationJob`] per channel (email, SMS,
//! log). The [`NotificationDispatcher`] delivers them on a bounded worker
//! pool so the detection loop never waits on network or disk I/O.
mod abstraction;
mod alert_log;
mod dispatcher;
mod email;
mod http;
mod ntfy;
mod sms;

pub use abstraction::{AlertChannel, AlertChannels, NotificationJob, NullAlertChannel};
pub use alert_log::{AlertLogRecord, JsonLinesAlertLog};
pub use dispatcher::{DispatchStats, NotificationDispatcher};
pub use email::{DEFAULT_SENDGRID_API_BASE, SendGridEmailChannel, SendGridEmailConfig};
pub use ntfy::NtfyAlertChannel;
pub use sms::{DEFAULT_TWILIO_API_BASE, TwilioSmsChannel, TwilioSmsConfig};
