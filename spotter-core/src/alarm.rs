// ============================================================================
// spotter-core/src/alarm.rs
// ============================================================================
//
// ALARM PLAYER: Exclusive Audible Alert
//
// The alarm is requested on every frame in which the target is visible. The
// player makes sure at most one playback runs at a time: a trigger while a
// playback is in flight is dropped, not queued.
//
// KEY COMPONENTS:
// - AlarmSound: Trait for the audio collaborator (blocking playback)
// - CommandAlarmSound: Plays a sound file through an external player
// - NullAlarmSound: Silent implementation for disabled alarms and tests
// - AlarmPlayer: Single-instance, non-blocking trigger
//
// AI-ASSISTANT-INFO: Exclusive alarm playback on a background thread

// ---- Standard library imports ----
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// ---- External crate imports ----
use log::{debug, error, warn};

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ============================================================================
// AUDIO COLLABORATOR
// ============================================================================

/// Audio backend. `play` blocks until playback has finished.
pub trait AlarmSound: Send + Sync {
    fn play(&self) -> CoreResult<()>;
}

/// Silent alarm, used when audio output is disabled.
#[derive(Debug, Clone, Default)]
pub struct NullAlarmSound;

impl AlarmSound for NullAlarmSound {
    fn play(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// Plays a sound file by running an external audio player.
#[derive(Debug, Clone)]
pub struct CommandAlarmSound {
    program: String,
    args: Vec<String>,
    sound_file: PathBuf,
}

impl CommandAlarmSound {
    /// Uses the platform player: `afplay` on macOS, `aplay` elsewhere.
    pub fn new(sound_file: impl Into<PathBuf>) -> Self {
        let program = if cfg!(target_os = "macos") {
            "afplay"
        } else {
            "aplay"
        };
        Self::with_player(program, Vec::new(), sound_file)
    }

    /// Uses a specific player program. The sound file is passed as the last
    /// argument.
    pub fn with_player(
        program: impl Into<String>,
        args: Vec<String>,
        sound_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            sound_file: sound_file.into(),
        }
    }

    pub fn sound_file(&self) -> &Path {
        &self.sound_file
    }
}

impl AlarmSound for CommandAlarmSound {
    fn play(&self) -> CoreResult<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(&self.sound_file)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        debug!(
            "Executing alarm player: {} {} {}",
            self.program,
            self.args.join(" "),
            self.sound_file.display()
        );

        let output = cmd.output().map_err(|e| {
            CoreError::AlarmPlayback(format!("failed to run '{}': {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::AlarmPlayback(format!(
                "'{}' exited with code {}: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// ALARM PLAYER
// ============================================================================

/// Counters describing alarm activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlarmStats {
    pub started: u64,
    pub dropped: u64,
    pub failed: u64,
}

#[derive(Default)]
struct PlayerState {
    in_flight: AtomicBool,
    started: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
    idle_lock: Mutex<()>,
    idle: Condvar,
}

impl PlayerState {
    fn finish(&self) {
        // Take the lock so a waiter cannot miss the notification between its
        // flag check and its wait.
        let _guard = self.idle_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.in_flight.store(false, Ordering::Release);
        self.idle.notify_all();
    }
}

/// Clears the in-flight flag when the playback thread ends, panics included.
struct InFlightGuard(Arc<PlayerState>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Non-blocking, single-instance alarm trigger.
#[derive(Clone)]
pub struct AlarmPlayer {
    sound: Arc<dyn AlarmSound>,
    state: Arc<PlayerState>,
}

impl AlarmPlayer {
    pub fn new(sound: Arc<dyn AlarmSound>) -> Self {
        Self {
            sound,
            state: Arc::new(PlayerState::default()),
        }
    }

    /// A player that never makes a sound.
    pub fn silent() -> Self {
        Self::new(Arc::new(NullAlarmSound))
    }

    /// Starts a playback unless one is already running.
    ///
    /// Returns `true` when a new playback was started, `false` when the
    /// request was dropped.
    pub fn trigger(&self) -> bool {
        if self
            .state
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.state.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let sound = Arc::clone(&self.sound);
        let guard = InFlightGuard(Arc::clone(&self.state));
        let spawned = thread::Builder::new()
            .name("spotter-alarm".to_string())
            .spawn(move || {
                let state = Arc::clone(&guard.0);
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| sound.play()));
                match outcome {
                    Ok(Ok(())) => debug!("Alarm playback finished"),
                    Ok(Err(e)) => {
                        state.failed.fetch_add(1, Ordering::Relaxed);
                        warn!("Alarm sound error: {}", e);
                    }
                    Err(_) => {
                        state.failed.fetch_add(1, Ordering::Relaxed);
                        error!("Alarm playback panicked");
                    }
                }
                drop(guard);
            });

        match spawned {
            Ok(_) => {
                self.state.started.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                // The closure and its guard were dropped, clearing the flag.
                self.state.failed.fetch_add(1, Ordering::Relaxed);
                error!("Failed to spawn alarm playback thread: {}", e);
                false
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.in_flight.load(Ordering::Acquire)
    }

    /// Waits until no playback is in flight. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self
            .state
            .idle_lock
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        while self.state.in_flight.load(Ordering::Acquire) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            guard = match self.state.idle.wait_timeout(guard, remaining) {
                Ok((g, _)) => g,
                Err(e) => e.into_inner().0,
            };
        }
        true
    }

    pub fn stats(&self) -> AlarmStats {
        AlarmStats {
            started: self.state.started.load(Ordering::Relaxed),
            dropped: self.state.dropped.load(Ordering::Relaxed),
            failed: self.state.failed.load(Ordering::Relaxed),
        }
    }
}
