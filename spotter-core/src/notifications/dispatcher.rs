// ============================================================================
// spotter-core/src/notifications/dispatcher.rs
// ============================================================================
//
// NOTIFICATION DISPATCHER: Fire-and-Forget Alert Delivery
//
// The detection loop must never wait on email, SMS or database round trips.
// The dispatcher hands every job to a bounded rayon thread pool and returns
// immediately. Each job runs against its own channel; failures and panics
// are caught on the worker, logged and counted, and never reach the loop or
// the other channels.
//
// There are no retries and no ordering between channels. The pool queue is
// unbounded: alert rounds are already throttled by the cooldown.
//
// AI-ASSISTANT-INFO: Bounded worker pool for alert channel delivery

// ---- Standard library imports ----
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

// ---- External crate imports ----
use log::{debug, error, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

// ---- Internal crate imports ----
use super::abstraction::{AlertChannels, NotificationJob};
use crate::error::{CoreError, CoreResult};

/// Counters describing dispatcher activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Number of jobs handed out but not yet finished.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn increment(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
    }

    fn decrement(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// Non-blocking executor for email, SMS and log jobs.
pub struct NotificationDispatcher {
    pool: ThreadPool,
    channels: AlertChannels,
    counters: Arc<Counters>,
    pending: Arc<Pending>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher with `workers` delivery threads.
    pub fn new(channels: AlertChannels, workers: usize) -> CoreResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("spotter-dispatch-{}", i))
            .panic_handler(|_| error!("Notification worker panicked outside a job"))
            .build()
            .map_err(|e| {
                CoreError::OperationFailed(format!(
                    "Failed to initialize dispatch thread pool: {}",
                    e
                ))
            })?;

        debug!(
            "Notification dispatcher ready with {} workers (email: {}, sms: {}, log: {})",
            workers.max(1),
            channels.email.name(),
            channels.sms.name(),
            channels.log.name()
        );

        Ok(Self {
            pool,
            channels,
            counters: Arc::new(Counters::default()),
            pending: Arc::new(Pending::default()),
        })
    }

    /// Hands a job to a worker and returns immediately.
    pub fn dispatch(&self, job: NotificationJob) {
        let Some(channel) = self.channels.for_action(job.kind).cloned() else {
            warn!("No alert channel handles {} jobs, discarding", job.kind);
            return;
        };

        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        self.pending.increment();

        let counters = Arc::clone(&self.counters);
        let pending = Arc::clone(&self.pending);
        self.pool.spawn(move || {
            let started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| channel.deliver(&job)));
            match outcome {
                Ok(Ok(())) => {
                    counters.succeeded.fetch_add(1, Ordering::Relaxed);
                    info!(
                        "✅ {} alert sent for frame {} ({:.2} cm) in {:.0?}",
                        channel.name(),
                        job.frame_index,
                        job.distance_cm,
                        started.elapsed()
                    );
                }
                Ok(Err(e)) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!("❌ {} alert failed for frame {}: {}", channel.name(), job.frame_index, e);
                }
                Err(_) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        "❌ {} channel panicked while delivering frame {}",
                        channel.name(),
                        job.frame_index
                    );
                }
            }
            pending.decrement();
        });
    }

    /// Jobs dispatched but not finished yet.
    pub fn pending(&self) -> usize {
        *self.pending.count.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Waits for every dispatched job to finish. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let count = self.pending.count.lock().unwrap_or_else(|e| e.into_inner());
        let result = self
            .pending
            .idle
            .wait_timeout_while(count, timeout, |count| *count > 0);
        match result {
            Ok((_, timeout_result)) => !timeout_result.timed_out(),
            Err(poisoned) => !poisoned.into_inner().1.timed_out(),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}
