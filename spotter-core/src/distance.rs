//! Pinhole-camera distance estimation from bounding-box width.

use crate::detection::Detection;

/// Distance of a detected object, valid only for the frame it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMeasurement {
    pub distance_cm: f32,
    pub source_detection: Detection,
}

/// Maps an observed pixel width to a physical distance using a known
/// reference width and a calibrated focal length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimator {
    reference_width_cm: f32,
    focal_length_px: f32,
}

impl DistanceEstimator {
    pub fn new(reference_width_cm: f32, focal_length_px: f32) -> Self {
        Self {
            reference_width_cm,
            focal_length_px,
        }
    }

    /// Returns `W * F / pixel_width`.
    ///
    /// Zero, negative and non-finite widths carry no reliable distance and
    /// yield `0.0` instead of an error.
    pub fn estimate(&self, pixel_width: f32) -> f32 {
        if pixel_width > 0.0 && pixel_width.is_finite() {
            self.reference_width_cm * self.focal_length_px / pixel_width
        } else {
            0.0
        }
    }

    pub fn measure(&self, detection: &Detection) -> DistanceMeasurement {
        DistanceMeasurement {
            distance_cm: self.estimate(detection.bounding_box.width),
            source_detection: detection.clone(),
        }
    }
}
