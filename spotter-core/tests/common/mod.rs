// spotter-core/tests/common/mod.rs
//
// Shared collaborators for the integration tests.

#![allow(dead_code)]

use spotter_core::error::{CoreError, CoreResult};
use spotter_core::notifications::{AlertChannel, NotificationJob};
use spotter_core::{AlarmSound, BoundingBox, Detection, Detector, Frame, FrameSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Channel that records every job it receives and can be told to fail.
pub struct MockChannel {
    name: String,
    fail: bool,
    jobs: Mutex<Vec<NotificationJob>>,
}

impl MockChannel {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail: false,
            jobs: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail: true,
            jobs: Mutex::new(Vec::new()),
        })
    }

    pub fn jobs(&self) -> Vec<NotificationJob> {
        self.jobs.lock().unwrap().clone()
    }

    /// Frame indices of received jobs, sorted since workers finish in any order.
    pub fn frame_indices(&self) -> Vec<u64> {
        let mut indices: Vec<u64> = self.jobs().iter().map(|j| j.frame_index).collect();
        indices.sort_unstable();
        indices
    }
}

impl AlertChannel for MockChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, job: &NotificationJob) -> CoreResult<()> {
        self.jobs.lock().unwrap().push(job.clone());
        if self.fail {
            return Err(CoreError::channel(&self.name, "simulated provider outage"));
        }
        Ok(())
    }
}

/// Alarm sound that only counts playbacks.
#[derive(Default)]
pub struct CountingSound {
    pub plays: AtomicU64,
}

impl CountingSound {
    pub fn plays(&self) -> u64 {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AlarmSound for CountingSound {
    fn play(&self) -> CoreResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Frame source emitting `count` frames spaced `interval` apart, 1-based.
pub struct SteppedSource {
    start: Instant,
    interval: Duration,
    next: u64,
    count: u64,
}

impl SteppedSource {
    pub fn new(count: u64, interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval,
            next: 1,
            count,
        }
    }
}

impl FrameSource for SteppedSource {
    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        if self.next > self.count {
            return Ok(None);
        }
        let index = self.next;
        self.next += 1;
        let captured_at = self.start + self.interval * (index - 1) as u32;
        Ok(Some(Frame::new(index, captured_at)))
    }
}

/// Detector reporting one target detection on the listed frames only.
pub struct PresenceDetector {
    label: String,
    present: Box<dyn Fn(u64) -> bool + Send>,
}

impl PresenceDetector {
    pub fn new(label: &str, present: impl Fn(u64) -> bool + Send + 'static) -> Self {
        Self {
            label: label.to_string(),
            present: Box::new(present),
        }
    }
}

impl Detector for PresenceDetector {
    fn detect(&mut self, frame: &Frame) -> CoreResult<Vec<Detection>> {
        if (self.present)(frame.index) {
            Ok(vec![Detection::new(
                self.label.clone(),
                0.9,
                BoundingBox::new(100.0, 80.0, 86.1, 160.0),
            )])
        } else {
            Ok(Vec::new())
        }
    }
}
