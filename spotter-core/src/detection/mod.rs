//! Detection data model and collaborator boundaries.
//!
//! This module defines what the detection loop consumes from the outside
//! world: frames from a [`FrameSource`], detections from a [`Detector`], and
//! the policy used to pick a single detection when several boxes of the
//! target class show up in the same frame.

pub mod suppression;
pub mod vocabulary;

pub use suppression::{ThresholdedDetector, non_max_suppression};
pub use vocabulary::ClassVocabulary;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// ============================================================================
// GEOMETRY
// ============================================================================

/// Axis-aligned bounding box in pixel units, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn xmax(&self) -> f32 {
        self.x + self.width
    }

    pub fn ymax(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let l = self.x.max(other.x);
        let r = self.xmax().min(other.xmax());
        let t = self.y.max(other.y);
        let b = self.ymax().min(other.ymax());
        (r - l).max(0.0) * (b - t).max(0.0)
    }

    /// Intersection over union. Two empty boxes have an IoU of zero.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let union = self.area() + other.area() - self.intersection_area(other);
        if union <= 0.0 {
            return 0.0;
        }
        self.intersection_area(other) / union
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

// ============================================================================
// DETECTION
// ============================================================================

/// One object reported by the detector for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_label: String,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

impl Detection {
    pub fn new(class_label: impl Into<String>, confidence: f32, bounding_box: BoundingBox) -> Self {
        Self {
            class_label: class_label.into(),
            confidence,
            bounding_box,
        }
    }

    /// Checks the values a detector backend is trusted to produce.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(CoreError::Detection(format!(
                "confidence {} for '{}' is outside [0, 1]",
                self.confidence, self.class_label
            )));
        }
        if !self.bounding_box.is_finite() {
            return Err(CoreError::Detection(format!(
                "bounding box for '{}' has non-finite coordinates",
                self.class_label
            )));
        }
        Ok(())
    }
}

// ============================================================================
// FRAMES
// ============================================================================

/// A single captured frame.
///
/// `captured_at` is the instant the cooldown tracker uses as "now" for this
/// frame, so sources replaying recorded footage can run faster than real time
/// while keeping the original timing.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub captured_at: Instant,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Creates a frame without image data.
    pub fn new(index: u64, captured_at: Instant) -> Self {
        Self {
            index,
            captured_at,
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    pub fn with_image(mut self, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        self.width = width;
        self.height = height;
        self.pixels = pixels;
        self
    }
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Object detection backend.
///
/// Confidence and overlap thresholds belong to the backend (or to a
/// [`ThresholdedDetector`] wrapped around it), not to the loop.
pub trait Detector {
    fn detect(&mut self, frame: &Frame) -> CoreResult<Vec<Detection>>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> CoreResult<Vec<Detection>> {
        (**self).detect(frame)
    }
}

/// Source of frames.
///
/// * `Ok(Some(frame))` - a frame was captured
/// * `Ok(None)` - the source is exhausted and the loop should stop
/// * `Err(_)` - acquisition failed for this attempt; the loop skips it
pub trait FrameSource {
    fn next_frame(&mut self) -> CoreResult<Option<Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        (**self).next_frame()
    }
}

// ============================================================================
// SELECTION POLICY
// ============================================================================

/// Which target detection drives distance and alerting when a frame holds
/// several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// The first detection in detector order.
    First,
    /// The most confident detection; ties keep detector order.
    #[default]
    HighestConfidence,
    /// The widest box, i.e. the one closest to the camera.
    Nearest,
}

impl SelectionPolicy {
    pub fn select<'a>(&self, candidates: &[&'a Detection]) -> Option<&'a Detection> {
        let mut iter = candidates.iter().copied();
        match self {
            SelectionPolicy::First => iter.next(),
            SelectionPolicy::HighestConfidence => {
                iter.reduce(|best, d| if d.confidence > best.confidence { d } else { best })
            }
            SelectionPolicy::Nearest => iter.reduce(|best, d| {
                if d.bounding_box.width > best.bounding_box.width {
                    d
                } else {
                    best
                }
            }),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionPolicy::First => "first",
            SelectionPolicy::HighestConfidence => "highest-confidence",
            SelectionPolicy::Nearest => "nearest",
        };
        f.write_str(name)
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(SelectionPolicy::First),
            "highest-confidence" | "confidence" => Ok(SelectionPolicy::HighestConfidence),
            "nearest" => Ok(SelectionPolicy::Nearest),
            other => Err(format!(
                "unknown selection policy '{}' (expected first, highest-confidence or nearest)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, confidence: f32, width: f32) -> Detection {
        Detection::new(label, confidence, BoundingBox::new(0.0, 0.0, width, width))
    }

    #[test]
    fn test_iou_of_identical_and_disjoint_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 10.0, 10.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(BoundingBox::default().iou(&BoundingBox::default()), 0.0);
    }

    #[test]
    fn test_iou_half_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 10.0, 10.0);
        // 50 / (100 + 100 - 50)
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(det("cell phone", 0.5, 10.0).validate().is_ok());
        assert!(det("cell phone", 1.5, 10.0).validate().is_err());
        assert!(det("cell phone", f32::NAN, 10.0).validate().is_err());
        let mut d = det("cell phone", 0.5, 10.0);
        d.bounding_box.width = f32::INFINITY;
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_selection_policies() {
        let a = det("cell phone", 0.6, 40.0);
        let b = det("cell phone", 0.9, 20.0);
        let c = det("cell phone", 0.9, 60.0);
        let candidates = vec![&a, &b, &c];

        assert_eq!(SelectionPolicy::First.select(&candidates), Some(&a));
        // Tie on confidence keeps the earlier detection.
        assert_eq!(SelectionPolicy::HighestConfidence.select(&candidates), Some(&b));
        assert_eq!(SelectionPolicy::Nearest.select(&candidates), Some(&c));
        assert_eq!(SelectionPolicy::First.select(&[]), None);
    }

    #[test]
    fn test_selection_policy_parsing() {
        assert_eq!("nearest".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Nearest));
        assert_eq!(
            "Highest-Confidence".parse::<SelectionPolicy>(),
            Ok(SelectionPolicy::HighestConfidence)
        );
        assert!("largest".parse::<SelectionPolicy>().is_err());
        assert_eq!(SelectionPolicy::First.to_string(), "first");
    }
}
