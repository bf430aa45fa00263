// ============================================================================
// spotter-core/src/notifications/alert_log.rs
// ============================================================================
//
// ALERT LOG: Durable Record of Alert Rounds
//
// Appends one JSON object per log job to a local file, giving a queryable
// history of detections (timestamp, label, distance). The file is opened once
// in append mode and shared by the dispatcher workers behind a mutex.
//
// AI-ASSISTANT-INFO: JSON Lines implementation of the log AlertChannel

// ---- Standard library imports ----
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ---- External crate imports ----
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---- Internal crate imports ----
use super::abstraction::{AlertChannel, NotificationJob};
use crate::error::{CoreError, CoreResult};

/// One line of the alert log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLogRecord {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub distance_cm: f32,
    pub frame_index: u64,
}

impl From<&NotificationJob> for AlertLogRecord {
    fn from(job: &NotificationJob) -> Self {
        Self {
            timestamp: job.issued_at,
            label: job.target_label.clone(),
            distance_cm: job.distance_cm,
            frame_index: job.frame_index,
        }
    }
}

/// Appends alert records to a JSON Lines file.
pub struct JsonLinesAlertLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesAlertLog {
    /// Opens (or creates) the log file, creating parent directories as needed.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record back from a log file.
    pub fn read_records(path: &Path) -> CoreResult<Vec<AlertLogRecord>> {
        let content = fs::read_to_string(path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(CoreError::from))
            .collect()
    }
}

impl AlertChannel for JsonLinesAlertLog {
    fn name(&self) -> &str {
        "log"
    }

    fn deliver(&self, job: &NotificationJob) -> CoreResult<()> {
        let mut line = serde_json::to_string(&AlertLogRecord::from(job))?;
        line.push('\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| CoreError::channel("log", "alert log lock poisoned"))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| {
                CoreError::channel("log", format!("write to {} failed: {}", self.path.display(), e))
            })
    }
}
