// ============================================================================
// spotter-core/src/recording.rs
// ============================================================================
//
// RECORDING REPLAY: Frame Source and Detector Backed by a Detection Log
//
// A recording is a JSON Lines file with one object per frame:
//
//   {"detections": [{"label": "cell phone", "confidence": 0.91, "bbox": [x, y, w, h]}]}
//   {"detections": [{"class_id": 77, "confidence": 0.64, "bbox": [x, y, w, h]}]}
//   {"error": "camera timeout"}
//
// The recording is split into a RecordedFrameSource, which emits frames at a
// fixed interval (and fails the frames carrying an `error`), and a
// RecordedDetector, which answers with the detections stored for each frame.
// Frame indices are 1-based line numbers.
//
// KEY COMPONENTS:
// - DetectionRecording: Parsed recording
// - RecordedFrameSource: FrameSource with synthetic or paced timestamps
// - RecordedDetector: Detector replaying stored detections
//
// AI-ASSISTANT-INFO: Replay of recorded detections through the core traits

// ---- Standard library imports ----
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ---- External crate imports ----
use log::debug;
use serde::{Deserialize, Serialize};

// ---- Internal crate imports ----
use crate::detection::{BoundingBox, ClassVocabulary, Detection, Detector, Frame, FrameSource};
use crate::error::{CoreError, CoreResult};

// ============================================================================
// RECORDING FORMAT
// ============================================================================

/// One stored detection. Either `label` or `class_id` names the class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedDetection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<usize>,
    pub confidence: f32,
    /// `[x, y, width, height]` in pixels.
    pub bbox: [f32; 4],
}

/// One line of a recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub detections: Vec<RecordedDetection>,
    /// Acquisition failure to simulate for this frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A parsed detection recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionRecording {
    frames: Vec<RecordedFrame>,
}

impl DetectionRecording {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self { frames }
    }

    /// Loads a recording file. Blank lines are ignored.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read recording '{}': {}",
                path.display(),
                e
            ))
        })?;
        let recording = Self::parse(&content)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(
            "Loaded recording {} with {} frames",
            path.display(),
            recording.len()
        );
        Ok(recording)
    }

    /// Parses recording text, reporting the first malformed line.
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut frames = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let frame: RecordedFrame = serde_json::from_str(line)
                .map_err(|e| format!("line {}: {}", number + 1, e))?;
            frames.push(frame);
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// The stored frame for a 1-based frame index.
    fn frame(&self, index: u64) -> Option<&RecordedFrame> {
        usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.frames.get(i))
    }
}

// ============================================================================
// FRAME SOURCE
// ============================================================================

/// Emits one frame per recording line at a fixed interval.
///
/// Timestamps are `start + position * interval`. With real-time pacing the
/// source also sleeps until each timestamp, otherwise it runs as fast as the
/// loop consumes frames.
pub struct RecordedFrameSource {
    recording: Arc<DetectionRecording>,
    frame_interval: Duration,
    realtime: bool,
    started_at: Instant,
    position: usize,
}

impl RecordedFrameSource {
    pub fn new(recording: Arc<DetectionRecording>, frame_interval: Duration) -> Self {
        Self {
            recording,
            frame_interval,
            realtime: false,
            started_at: Instant::now(),
            position: 0,
        }
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Sets the timestamp of the first frame.
    pub fn starting_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }
}

impl FrameSource for RecordedFrameSource {
    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        let Some(stored) = self.recording.frames.get(self.position) else {
            return Ok(None);
        };
        let offset = self.frame_interval * self.position as u32;
        self.position += 1;
        let index = self.position as u64;
        let captured_at = self.started_at + offset;

        if self.realtime {
            let wait = captured_at.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                thread::sleep(wait);
            }
        }

        if let Some(error) = &stored.error {
            return Err(CoreError::FrameAcquisition(format!(
                "frame {}: {}",
                index, error
            )));
        }
        Ok(Some(Frame::new(index, captured_at)))
    }
}

// ============================================================================
// DETECTOR
// ============================================================================

/// Answers each frame with the detections stored for its index.
pub struct RecordedDetector {
    recording: Arc<DetectionRecording>,
    vocabulary: Option<ClassVocabulary>,
}

impl RecordedDetector {
    pub fn new(recording: Arc<DetectionRecording>) -> Self {
        Self {
            recording,
            vocabulary: None,
        }
    }

    /// Resolves `class_id` entries through a class vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: ClassVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    fn resolve_label(&self, stored: &RecordedDetection) -> CoreResult<String> {
        if let Some(label) = &stored.label {
            return Ok(label.clone());
        }
        let class_id = stored.class_id.ok_or_else(|| {
            CoreError::Detection("recorded detection has neither label nor class_id".to_string())
        })?;
        self.vocabulary
            .as_ref()
            .and_then(|v| v.label_for(class_id))
            .map(str::to_string)
            .ok_or_else(|| CoreError::Detection(format!("unknown class id {}", class_id)))
    }
}

impl Detector for RecordedDetector {
    fn detect(&mut self, frame: &Frame) -> CoreResult<Vec<Detection>> {
        let Some(stored) = self.recording.frame(frame.index) else {
            return Ok(Vec::new());
        };
        stored
            .detections
            .iter()
            .map(|d| {
                let [x, y, width, height] = d.bbox;
                Ok(Detection::new(
                    self.resolve_label(d)?,
                    d.confidence,
                    BoundingBox::new(x, y, width, height),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"detections": []}

{"detections": [{"label": "cell phone", "confidence": 0.91, "bbox": [10, 20, 64, 120]}]}
{"error": "camera timeout"}
{"detections": [{"class_id": 2, "confidence": 0.7, "bbox": [0, 0, 30, 30]}]}
"#;

    fn split(
        recording: DetectionRecording,
        start: Instant,
    ) -> (RecordedFrameSource, RecordedDetector) {
        let recording = Arc::new(recording);
        (
            RecordedFrameSource::new(recording.clone(), Duration::from_secs(1)).starting_at(start),
            RecordedDetector::new(recording),
        )
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let recording = DetectionRecording::parse(SAMPLE).unwrap();
        assert_eq!(recording.len(), 4);
        assert_eq!(recording.frames()[2].error.as_deref(), Some("camera timeout"));
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = DetectionRecording::parse("{}\n{\"detections\": 5}\n").unwrap_err();
        assert!(err.starts_with("line 2:"), "{}", err);
    }

    #[test]
    fn test_source_timestamps_and_errors() {
        let start = Instant::now();
        let (mut source, _) = split(DetectionRecording::parse(SAMPLE).unwrap(), start);

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(first.captured_at, start);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.captured_at, start + Duration::from_secs(1));

        assert!(matches!(source.next_frame(), Err(CoreError::FrameAcquisition(_))));

        let fourth = source.next_frame().unwrap().unwrap();
        assert_eq!(fourth.index, 4);
        assert_eq!(fourth.captured_at, start + Duration::from_secs(3));

        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_detector_resolves_labels() {
        let start = Instant::now();
        let (_, detector) = split(DetectionRecording::parse(SAMPLE).unwrap(), start);
        let mut detector =
            detector.with_vocabulary(ClassVocabulary::from_labels(["person", "cell phone"]));

        let detections = detector.detect(&Frame::new(2, start)).unwrap();
        assert_eq!(detections[0].class_label, "cell phone");
        assert_eq!(detections[0].bounding_box.width, 64.0);

        let detections = detector.detect(&Frame::new(4, start)).unwrap();
        assert_eq!(detections[0].class_label, "cell phone");

        assert!(detector.detect(&Frame::new(99, start)).unwrap().is_empty());
    }

    #[test]
    fn test_class_id_without_vocabulary_is_detection_error() {
        let start = Instant::now();
        let (_, mut detector) = split(DetectionRecording::parse(SAMPLE).unwrap(), start);
        assert!(matches!(
            detector.detect(&Frame::new(4, start)),
            Err(CoreError::Detection(_))
        ));
    }
}
