//! # Termination wait-group.
//!
//! [`WaitGroup`] counts outstanding holds on the final stage of shutdown:
//! each registered dependent adds one, its monitor releases one, and the
//! shutdown driver waits for the count to drain to zero before declaring
//! shutdown complete.
//!
//! Cloning a [`WaitGroup`] clones a handle to the same counter, so a handle
//! can be passed into spawned monitor tasks and released there.
//!
//! Misuse (adding zero, releasing below zero) is a bug in the caller, not a
//! recoverable condition; it is reported through the attached
//! [`LifeLog::fatal`](crate::LifeLog::fatal). See [`WaitGroup::done`].

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::log::{LifeLog, NopLog};

struct Inner {
    count: Mutex<usize>,
    drained: Notify,
    /// Logger for misuse reports; kept in sync with the owning coordinator's.
    log: Mutex<Arc<dyn LifeLog>>,
}

/// Counter that blocks [`wait`](WaitGroup::wait)ers until it drains to zero.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    /// Creates a new wait-group with a count of zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                count: Mutex::new(0),
                drained: Notify::new(),
                log: Mutex::new(Arc::new(NopLog)),
            }),
        }
    }

    /// Attaches the logger used for misuse reports.
    pub(crate) fn set_log(&self, log: Arc<dyn LifeLog>) {
        *self
            .inner
            .log
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = log;
    }

    fn log(&self) -> Arc<dyn LifeLog> {
        self.inner
            .log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Adds `delta` holds to the counter.
    pub(crate) fn add(&self, delta: usize) {
        let mut count = self.lock();
        *count += delta;
    }

    /// Releases one hold.
    ///
    /// A release without a matching add means the shutdown driver may already
    /// have observed a drained counter and moved on; that is reported through
    /// [`LifeLog::fatal`](crate::LifeLog::fatal) (the provided logger
    /// implementations log and then panic).
    pub fn done(&self) {
        let wake = {
            let mut count = self.lock();
            if *count == 0 {
                drop(count);
                self.log().fatal("WaitGroup::done without matching add");
            }
            *count -= 1;
            *count == 0
        };
        if wake {
            self.inner.drained.notify_waiters();
        }
    }

    /// Current number of outstanding holds.
    pub fn holds(&self) -> usize {
        *self.lock()
    }

    /// Waits until the counter drains to zero.
    ///
    /// Returns immediately if the counter is already zero. Multiple waiters
    /// are all released on the same drain.
    pub async fn wait(&self) {
        loop {
            // register interest before re-checking, so a concurrent drain
            // between the check and the await cannot be missed
            let drained = self.inner.drained.notified();
            if *self.lock() == 0 {
                return;
            }
            drained.await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, usize> {
        self.inner.count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}
