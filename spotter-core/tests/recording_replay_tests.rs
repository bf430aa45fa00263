// spotter-core/tests/recording_replay_tests.rs
//
// Replays recorded detections through the loop into a real alert log file.

mod common;

use common::MockChannel;
use spotter_core::notifications::{AlertChannels, JsonLinesAlertLog, NotificationDispatcher};
use spotter_core::recording::{DetectionRecording, RecordedDetector, RecordedFrameSource};
use spotter_core::{
    AlarmPlayer, ClassVocabulary, CoreConfig, CoreConfigBuilder, DetectionLoop,
    ThresholdedDetector,
};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const RECORDING: &str = r#"{"detections": []}
{"detections": [{"label": "person", "confidence": 0.97, "bbox": [0, 0, 200, 400]}]}
{"detections": [{"label": "cell phone", "confidence": 0.88, "bbox": [310, 220, 61.5, 120]}, {"label": "cell phone", "confidence": 0.80, "bbox": [312, 221, 60, 118]}]}
{"error": "USB camera disconnected"}
{"detections": [{"class_id": 2, "confidence": 0.91, "bbox": [300, 210, 70, 130]}]}
{"detections": [{"label": "cell phone", "confidence": 0.30, "bbox": [300, 210, 70, 130]}]}
{"detections": [{"label": "cell phone", "confidence": 0.75, "bbox": [300, 210, 43, 80]}]}
"#;

#[test]
fn test_replay_writes_alert_log() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let recording_path = dir.path().join("desk.jsonl");
    fs::write(&recording_path, RECORDING)?;
    let log_path = dir.path().join("logs").join("alerts.jsonl");

    let config = CoreConfigBuilder::new().cooldown_seconds(30.0).build();
    let vocabulary = ClassVocabulary::from_labels(["person", "cell phone"]);
    config.validate_against(&vocabulary)?;

    let recording = Arc::new(DetectionRecording::from_file(&recording_path)?);
    let source = RecordedFrameSource::new(recording.clone(), Duration::from_secs(1));
    let detector = ThresholdedDetector::new(
        RecordedDetector::new(recording).with_vocabulary(vocabulary),
        config.confidence_threshold,
        config.overlap_suppression_threshold,
    );

    let email = MockChannel::new("email");
    let channels = AlertChannels::default()
        .with_email(email.clone())
        .with_log(Arc::new(JsonLinesAlertLog::open(&log_path)?));
    let dispatcher = Arc::new(NotificationDispatcher::new(channels, 2)?);

    let mut detection_loop = DetectionLoop::new(
        config,
        source,
        detector,
        AlarmPlayer::silent(),
        dispatcher.clone(),
    )?;
    let summary = detection_loop.run();
    assert!(dispatcher.wait_idle(Duration::from_secs(10)));

    // Frame 4 fails acquisition; frame 6 falls below the confidence threshold
    // and ends the first episode.
    assert_eq!(summary.frames_processed, 6);
    assert_eq!(summary.frames_skipped, 1);
    assert_eq!(summary.target_frames, 3);
    assert_eq!(summary.episodes, 2);
    assert_eq!(summary.log_jobs, 2);

    let records = JsonLinesAlertLog::read_records(&log_path)?;
    let mut frames: Vec<u64> = records.iter().map(|r| r.frame_index).collect();
    frames.sort_unstable();
    assert_eq!(frames, vec![3, 7]);

    let first = records.iter().find(|r| r.frame_index == 3).unwrap();
    assert_eq!(first.label, "cell phone");
    assert!((first.distance_cm - 70.0).abs() < 1e-3);

    let emails = email.jobs();
    assert_eq!(emails.len(), 2);
    assert!(emails.iter().all(|j| j.get_message().starts_with("A cell phone was detected")));
    Ok(())
}

#[test]
fn test_target_outside_vocabulary_is_rejected() {
    let config = CoreConfig {
        target_label: "toaster".to_string(),
        ..Default::default()
    };
    let vocabulary = ClassVocabulary::from_labels(["person", "cell phone"]);
    assert!(config.validate_against(&vocabulary).is_err());
}
