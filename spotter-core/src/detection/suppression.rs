// ============================================================================
// spotter-core/src/detection/suppression.rs
// ============================================================================
//
// DETECTION THRESHOLDS: Confidence Filtering and Non-Max Suppression
//
// Raw detector output usually contains low-confidence boxes and several
// overlapping boxes for the same object. ThresholdedDetector wraps any
// Detector and applies the configured confidence threshold and per-class
// non-max suppression before the loop sees the detections.
//
// AI-ASSISTANT-INFO: Confidence threshold and NMS wrapper for detectors

// ---- Standard library imports ----
use std::cmp::Ordering;

// ---- Internal crate imports ----
use super::{Detection, Detector, Frame};
use crate::error::CoreResult;

/// Greedy non-max suppression.
///
/// Detections are sorted by descending confidence; a detection is dropped
/// when its IoU with an already kept detection of the same class exceeds
/// `iou_threshold`.
pub fn non_max_suppression(detections: &mut Vec<Detection>, iou_threshold: f32) {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept = 0;
    for index in 0..detections.len() {
        let suppressed = (0..kept).any(|prev| {
            detections[prev].class_label == detections[index].class_label
                && detections[prev]
                    .bounding_box
                    .iou(&detections[index].bounding_box)
                    > iou_threshold
        });
        if !suppressed {
            detections.swap(kept, index);
            kept += 1;
        }
    }
    detections.truncate(kept);
}

/// Detector adapter applying confidence and overlap thresholds.
pub struct ThresholdedDetector<D> {
    inner: D,
    confidence_threshold: f32,
    overlap_threshold: f32,
}

impl<D: Detector> ThresholdedDetector<D> {
    pub fn new(inner: D, confidence_threshold: f32, overlap_threshold: f32) -> Self {
        Self {
            inner,
            confidence_threshold,
            overlap_threshold,
        }
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: Detector> Detector for ThresholdedDetector<D> {
    fn detect(&mut self, frame: &Frame) -> CoreResult<Vec<Detection>> {
        let raw = self.inner.detect(frame)?;
        let raw_count = raw.len();

        let mut detections: Vec<Detection> = raw
            .into_iter()
            .filter(|d| d.confidence >= self.confidence_threshold)
            .collect();
        non_max_suppression(&mut detections, self.overlap_threshold);

        if detections.len() != raw_count {
            log::trace!(
                "Frame {}: kept {} of {} raw detections",
                frame.index,
                detections.len(),
                raw_count
            );
        }
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;
    use std::time::Instant;

    struct Fixed(Vec<Detection>);

    impl Detector for Fixed {
        fn detect(&mut self, _frame: &Frame) -> CoreResult<Vec<Detection>> {
            Ok(self.0.clone())
        }
    }

    fn det(label: &str, confidence: f32, x: f32) -> Detection {
        Detection::new(label, confidence, BoundingBox::new(x, 0.0, 10.0, 10.0))
    }

    #[test]
    fn test_nms_keeps_most_confident_of_overlapping_pair() {
        let mut detections = vec![det("cell phone", 0.6, 0.0), det("cell phone", 0.9, 1.0)];
        non_max_suppression(&mut detections, 0.2);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].confidence, 0.9);
    }

    #[test]
    fn test_nms_is_per_class() {
        let mut detections = vec![det("cell phone", 0.9, 0.0), det("remote", 0.8, 0.0)];
        non_max_suppression(&mut detections, 0.2);
        assert_eq!(detections.len(), 2);
    }

    #[test]
    fn test_thresholded_detector_filters_low_confidence() {
        let inner = Fixed(vec![
            det("cell phone", 0.4, 0.0),
            det("cell phone", 0.7, 100.0),
            det("cell phone", 0.8, 101.0),
        ]);
        let mut detector = ThresholdedDetector::new(inner, 0.55, 0.2);
        let out = detector.detect(&Frame::new(0, Instant::now())).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].confidence, 0.8);
    }
}
