// ============================================================================
// spotter-core/src/pipeline.rs
// ============================================================================
//
// DETECTION LOOP: Per-Frame Alert Orchestration
//
// This module houses the main loop of the spotter-core library. It pulls
// frames from a FrameSource, runs the Detector, filters for the target class,
// measures distance, asks the cooldown tracker for a decision and issues the
// resulting side effects without waiting on any of them.
//
// KEY COMPONENTS:
// - DetectionLoop: Owns the source, detector and all tracker state
// - FrameAnnotation / FrameSink: Display hand-off for annotated frames
// - ShutdownHandle: Cooperative stop flag shared with signal handlers
// - LoopSummary: Counters reported when the loop ends
//
// WORKFLOW (per frame):
// 1. Acquire a frame; acquisition errors skip the frame
// 2. Run the detector; detector errors count as "no detection"
// 3. Keep target-class detections, select one, measure its distance
// 4. Update the cooldown tracker and get the alert decision
// 5. Issue alarm, email, sms, log requests in that order
// 6. Hand the frame and its annotations to the sink
//
// AI-ASSISTANT-INFO: Main detection loop and alert orchestration

// ---- Standard library imports ----
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ---- External crate imports ----
use log::{debug, info, warn};
use serde::Serialize;

// ---- Internal crate imports ----
use crate::alarm::AlarmPlayer;
use crate::config::CoreConfig;
use crate::cooldown::{AlertAction, AlertCooldownTracker, AlertDecision};
use crate::detection::{BoundingBox, Detection, Detector, Frame, FrameSource};
use crate::distance::{DistanceEstimator, DistanceMeasurement};
use crate::error::CoreResult;
use crate::notifications::{NotificationDispatcher, NotificationJob};

// ============================================================================
// ANNOTATIONS AND DISPLAY
// ============================================================================

/// Overlay information for one target detection.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnnotation {
    pub bounding_box: BoundingBox,
    pub label: String,
    pub confidence: f32,
    pub distance_cm: f32,
}

impl FrameAnnotation {
    /// Overlay text, e.g. `cell phone 87.5% | 43.0cm`.
    pub fn text(&self) -> String {
        format!(
            "{} {:.1}% | {:.1}cm",
            self.label,
            self.confidence * 100.0,
            self.distance_cm
        )
    }
}

/// Receives every processed frame with its annotations.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame, annotations: &[FrameAnnotation]);
}

/// Sink that discards frames (headless operation).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn present(&mut self, _frame: &Frame, _annotations: &[FrameAnnotation]) {}
}

// ============================================================================
// SHUTDOWN
// ============================================================================

/// Cooperative stop request, checked before each frame.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Counters for one run of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LoopSummary {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub detection_errors: u64,
    pub target_frames: u64,
    pub episodes: u64,
    pub alert_rounds: u64,
    pub alarm_requests: u64,
    pub alarms_started: u64,
    pub email_jobs: u64,
    pub sms_jobs: u64,
    pub log_jobs: u64,
}

/// What the loop did with one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub decision: AlertDecision,
    pub measurement: Option<DistanceMeasurement>,
    pub annotations: Vec<FrameAnnotation>,
}

impl FrameOutcome {
    fn absent() -> Self {
        Self {
            decision: AlertDecision::NONE,
            measurement: None,
            annotations: Vec::new(),
        }
    }
}

// ============================================================================
// DETECTION LOOP
// ============================================================================

/// Sequential perception loop. All tracker state lives here and is touched
/// only by the thread calling [`DetectionLoop::run`].
pub struct DetectionLoop<S, D> {
    config: CoreConfig,
    source: S,
    detector: D,
    estimator: DistanceEstimator,
    tracker: AlertCooldownTracker,
    alarm: AlarmPlayer,
    dispatcher: Arc<NotificationDispatcher>,
    sink: Box<dyn FrameSink>,
    shutdown: ShutdownHandle,
    summary: LoopSummary,
}

impl<S: FrameSource, D: Detector> DetectionLoop<S, D> {
    /// Creates a loop after validating the configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(DetectionLoop)` - Ready to run
    /// * `Err(CoreError::Config)` - If the configuration is invalid
    pub fn new(
        config: CoreConfig,
        source: S,
        detector: D,
        alarm: AlarmPlayer,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> CoreResult<Self> {
        config.validate()?;
        let estimator =
            DistanceEstimator::new(config.known_reference_width_cm, config.focal_length_px);
        let tracker = AlertCooldownTracker::new(config.cooldown()?, config.cooldown_scope);

        Ok(Self {
            config,
            source,
            detector,
            estimator,
            tracker,
            alarm,
            dispatcher,
            sink: Box::new(NullFrameSink),
            shutdown: ShutdownHandle::new(),
            summary: LoopSummary::default(),
        })
    }

    pub fn with_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    /// Runs until the source is exhausted or shutdown is requested.
    pub fn run(&mut self) -> LoopSummary {
        info!(
            "Watching for '{}' (cooldown {}s, {} scope, {} selection)",
            self.config.target_label,
            self.config.cooldown_seconds,
            self.config.cooldown_scope,
            self.config.selection_policy
        );

        loop {
            if self.shutdown.is_requested() {
                info!("Shutdown requested, stopping detection loop");
                break;
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Frame source exhausted");
                    break;
                }
                Err(e) => {
                    self.summary.frames_skipped += 1;
                    warn!("Skipping frame: {}", e);
                    continue;
                }
            };

            self.process_frame(&frame);
        }

        if let Some(episode) = self.tracker.current_episode() {
            debug!(
                "Loop ended during an active episode ({} frames, {} rounds)",
                episode.frames, episode.alert_rounds
            );
        }
        self.summary
    }

    /// Processes one frame: detect, decide, act, present.
    pub fn process_frame(&mut self, frame: &Frame) -> FrameOutcome {
        self.summary.frames_processed += 1;

        let targets = match self.target_detections(frame) {
            Ok(targets) => targets,
            Err(e) => {
                self.summary.detection_errors += 1;
                warn!("Frame {}: treating as no detection: {}", frame.index, e);
                Vec::new()
            }
        };

        let annotations: Vec<FrameAnnotation> = targets
            .iter()
            .map(|d| FrameAnnotation {
                bounding_box: d.bounding_box,
                label: d.class_label.clone(),
                confidence: d.confidence,
                distance_cm: self.estimator.estimate(d.bounding_box.width),
            })
            .collect();

        let candidates: Vec<&Detection> = targets.iter().collect();
        let outcome = match self.config.selection_policy.select(&candidates) {
            None => {
                self.tracker.observe_absent();
                FrameOutcome::absent()
            }
            Some(selected) => {
                let measurement = self.estimator.measure(selected);
                let decision = self.tracker.observe_present(frame.captured_at);
                self.summary.target_frames += 1;
                debug!(
                    "Frame {}: {} at {:.2} cm (confidence {:.2})",
                    frame.index,
                    selected.class_label,
                    measurement.distance_cm,
                    selected.confidence
                );
                self.issue(frame, &decision, measurement.distance_cm);
                FrameOutcome {
                    decision,
                    measurement: Some(measurement),
                    annotations: Vec::new(),
                }
            }
        };
        self.summary.episodes = self.tracker.episodes_started();

        self.sink.present(frame, &annotations);
        FrameOutcome {
            annotations,
            ..outcome
        }
    }

    /// Validated detections of the target class, in detector order.
    fn target_detections(&mut self, frame: &Frame) -> CoreResult<Vec<Detection>> {
        let targets: Vec<Detection> = self
            .detector
            .detect(frame)?
            .into_iter()
            .filter(|d| d.class_label == self.config.target_label)
            .collect();
        for detection in &targets {
            detection.validate()?;
        }
        Ok(targets)
    }

    /// Issues the decision's actions in alarm, email, sms, log order.
    fn issue(&mut self, frame: &Frame, decision: &AlertDecision, distance_cm: f32) {
        if decision.is_alert_round() {
            self.summary.alert_rounds += 1;
            info!(
                "🚨 {} detected at {:.2} cm (frame {})",
                self.config.target_label, distance_cm, frame.index
            );
        }

        for action in decision.actions() {
            match action {
                AlertAction::Alarm => {
                    self.summary.alarm_requests += 1;
                    if self.alarm.trigger() {
                        self.summary.alarms_started += 1;
                    }
                }
                AlertAction::Email => {
                    self.summary.email_jobs += 1;
                    self.dispatch(action, frame, distance_cm);
                }
                AlertAction::Sms => {
                    self.summary.sms_jobs += 1;
                    self.dispatch(action, frame, distance_cm);
                }
                AlertAction::Log => {
                    self.summary.log_jobs += 1;
                    self.dispatch(action, frame, distance_cm);
                }
            }
        }
    }

    fn dispatch(&self, action: AlertAction, frame: &Frame, distance_cm: f32) {
        self.dispatcher.dispatch(NotificationJob::new(
            action,
            &self.config.target_label,
            distance_cm,
            frame.index,
        ));
    }
}
