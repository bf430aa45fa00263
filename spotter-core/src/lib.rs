//! Core library for real-time object spotting and alerting.
//!
//! This crate turns per-frame object detections into alerts: it estimates the
//! distance of a target object, decides through a cooldown state machine
//! which frames are worth acting on, plays an exclusive audible alarm and
//! dispatches email, SMS and log notifications without ever blocking the
//! perception loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use spotter_core::{AlarmPlayer, CoreConfigBuilder, DetectionLoop};
//! use spotter_core::notifications::{AlertChannels, JsonLinesAlertLog, NotificationDispatcher};
//! use spotter_core::recording::{DetectionRecording, RecordedDetector, RecordedFrameSource};
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = CoreConfigBuilder::new()
//!     .target_label("cell phone")
//!     .cooldown_seconds(30.0)
//!     .build();
//!
//! let recording = Arc::new(DetectionRecording::from_file(Path::new("desk.jsonl")).unwrap());
//! let source = RecordedFrameSource::new(recording.clone(), Duration::from_millis(100));
//! let detector = RecordedDetector::new(recording);
//!
//! let channels = AlertChannels::default()
//!     .with_log(Arc::new(JsonLinesAlertLog::open("alerts.jsonl").unwrap()));
//! let dispatcher = Arc::new(NotificationDispatcher::new(channels, config.dispatch_workers).unwrap());
//!
//! let mut detection_loop = DetectionLoop::new(
//!     config,
//!     source,
//!     detector,
//!     AlarmPlayer::silent(),
//!     dispatcher.clone(),
//! )
//! .unwrap();
//! let summary = detection_loop.run();
//! dispatcher.wait_idle(Duration::from_secs(10));
//! println!("{} alert rounds", summary.alert_rounds);
//! ```

pub mod alarm;
pub mod config;
pub mod cooldown;
pub mod detection;
pub mod distance;
pub mod error;
pub mod notifications;
pub mod pipeline;
pub mod recording;

// Re-exports for public API
pub use alarm::{AlarmPlayer, AlarmSound, CommandAlarmSound, NullAlarmSound};
pub use config::{CoreConfig, CoreConfigBuilder};
pub use cooldown::{AlertAction, AlertCooldownTracker, AlertDecision, CooldownScope};
pub use detection::{
    BoundingBox, ClassVocabulary, Detection, Detector, Frame, FrameSource, SelectionPolicy,
    ThresholdedDetector,
};
pub use distance::{DistanceEstimator, DistanceMeasurement};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use notifications::{AlertChannel, AlertChannels, NotificationDispatcher, NotificationJob};
pub use pipeline::{
    DetectionLoop, FrameAnnotation, FrameOutcome, FrameSink, LoopSummary, NullFrameSink,
    ShutdownHandle,
};
