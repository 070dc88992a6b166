//! # Coordinator: the lifecycle state machine.
//!
//! [`Coordinator`] drives an embedding object through a monotone lifecycle:
//! one-shot activation, scheduled (and deferrable) shutdown, then orderly
//! teardown of dependents.
//!
//! ## Architecture
//! ```text
//! callers ──► transition methods ──► Mutex<Inner> (state, defer count, terminal outcome)
//!                                        │
//!                            advance() closes signals per edge
//!                                        ▼
//!              ┌─────────────────┬───────────────────┬──────────────────┐
//!         activation-done   shutdown-started   local-shutdown-done  shutdown-done
//!              │                  │                   │                  │
//!         blocked activators  context monitor    child monitors      waiters
//! ```
//!
//! ## Rules
//! - One coarse mutex serializes every state mutation; it is **never** held
//!   across an await, a user hook, or a child operation.
//! - Signals close exactly once, inside the lock, on the transition that
//!   makes them true.
//! - The shutdown driver runs in its own task, spawned by whichever call
//!   (schedule or undefer) performed the transition into shutting-down.
//! - The terminal outcome is latched at first schedule, replaced exactly
//!   once by the shutdown hook's return value, and immutable thereafter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{LifecycleError, Outcome};
use crate::hooks::{AsyncShutdown, OnceActivate, ShutdownFn, ShutdownHandler};
use crate::log::LifeLog;
use crate::signal::{Signal, Signaled};
use crate::state::State;
use crate::waitgroup::WaitGroup;

pub(crate) struct Inner {
    /// Progress in the lifecycle. Only ever increases; see [`State`].
    pub(crate) state: State,
    /// Latched by the first `start_shutdown`. Scheduling is always accepted;
    /// only the *start* of shutdown can be deferred.
    pub(crate) scheduled: bool,
    /// Number of undefer calls required before a scheduled shutdown may begin.
    pub(crate) defer_count: usize,
    /// Advisory outcome until the shutdown hook returns; terminal afterwards.
    pub(crate) terminal: Outcome,
    /// One-shot shutdown hook slot, taken by the shutdown driver.
    pub(crate) handler: Option<ShutdownHandler>,
    /// Activation capability of the managed object, if any.
    pub(crate) activator: Option<Arc<dyn OnceActivate>>,
    /// Logger; replaceable only while unactivated.
    pub(crate) log: Arc<dyn LifeLog>,
}

pub(crate) struct Core {
    pub(crate) lock: Mutex<Inner>,
    /// Relaxed mirror of "has ever been successfully activated".
    pub(crate) activated: AtomicBool,
    /// Closed when the activating phase ends (successfully or not). Internal.
    pub(crate) activation_done: Signal,
    pub(crate) shutdown_started: Signal,
    pub(crate) local_shutdown_done: Signal,
    pub(crate) shutdown_done: Signal,
    /// Holds off the terminal state until every dependent has released.
    pub(crate) wg: WaitGroup,
}

/// Embeddable, cloneable handle to one lifecycle state machine.
///
/// All clones share the same state. Construct through [`Coordinator::builder`].
///
/// - Activation: [`activate`](Coordinator::activate) /
///   [`activate_with`](Coordinator::activate_with): at most one hook run,
///   shared result for every caller.
/// - Shutdown: [`start_shutdown`](Coordinator::start_shutdown) schedules,
///   [`defer_shutdown`](Coordinator::defer_shutdown) holds off the start,
///   [`shutdown`](Coordinator::shutdown) / [`close`](Coordinator::close)
///   drive it synchronously.
/// - Dependents: registered via the `add_*` methods; torn down concurrently
///   after local shutdown, before [`shutdown_done`](Coordinator::shutdown_done)
///   closes.
#[derive(Clone)]
pub struct Coordinator {
    pub(crate) core: Arc<Core>,
}

impl Coordinator {
    /// Starts building a coordinator. See [`CoordinatorBuilder`](crate::CoordinatorBuilder).
    pub fn builder() -> crate::builder::CoordinatorBuilder {
        crate::builder::CoordinatorBuilder::new()
    }

    pub(crate) fn new_internal(
        log: Arc<dyn LifeLog>,
        activator: Option<Arc<dyn OnceActivate>>,
        handler: ShutdownHandler,
    ) -> Self {
        let wg = WaitGroup::new();
        wg.set_log(log.clone());
        Self {
            core: Arc::new(Core {
                lock: Mutex::new(Inner {
                    state: State::Unactivated,
                    scheduled: false,
                    defer_count: 0,
                    terminal: Ok(()),
                    handler: Some(handler),
                    activator,
                    log,
                }),
                activated: AtomicBool::new(false),
                activation_done: Signal::new(),
                shutdown_started: Signal::new(),
                local_shutdown_done: Signal::new(),
                shutdown_done: Signal::new(),
                wg,
            }),
        }
    }

    pub(crate) fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.core.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Performs the transition `inner.state → to` and closes the signals the
    /// new state makes true. Lock must be held. An illegal edge is a
    /// coordinator bug and is reported as fatal.
    pub(crate) fn advance(&self, inner: &mut Inner, to: State) {
        let from = inner.state;
        if !from.can_advance_to(to) {
            inner.log.fatal(&format!(
                "illegal state transition: {} -> {}",
                from.as_label(),
                to.as_label()
            ));
        }
        inner.state = to;
        match to {
            State::Activated => {
                self.core.activated.store(true, Ordering::Release);
                self.core.activation_done.close();
            }
            State::ShuttingDown => {
                // the activating phase is over even if it never happened
                if from < State::Activated {
                    self.core.activation_done.close();
                }
                self.core.shutdown_started.close();
            }
            State::LocalShutdown => self.core.local_shutdown_done.close(),
            State::ShutDown => self.core.shutdown_done.close(),
            State::Unactivated | State::Activating => {}
        }
    }

    // ---------------------------
    // Queries
    // ---------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.lock_inner().state
    }

    /// True if the object has ever been successfully activated.
    ///
    /// Once true, never reset, even after shutdown. If shutdown starts before
    /// activation succeeds, it remains false permanently. Lock-free.
    pub fn is_activated(&self) -> bool {
        self.core.activated.load(Ordering::Acquire)
    }

    /// True once [`start_shutdown`](Coordinator::start_shutdown) has been
    /// called, whether or not shutdown has actually begun.
    pub fn is_scheduled_shutdown(&self) -> bool {
        self.lock_inner().scheduled
    }

    /// True once shutdown has begun and can no longer be deferred.
    pub fn is_started_shutdown(&self) -> bool {
        self.lock_inner().state.is_started_shutdown()
    }

    /// True once the shutdown hook has returned; the terminal outcome is final.
    pub fn is_done_local_shutdown(&self) -> bool {
        self.lock_inner().state.is_done_local_shutdown()
    }

    /// True once shutdown is complete, including dependents.
    pub fn is_done_shutdown(&self) -> bool {
        self.lock_inner().state.is_done_shutdown()
    }

    /// The current terminal outcome.
    ///
    /// Final once [`local_shutdown_done`](Coordinator::local_shutdown_done)
    /// has closed; advisory before that.
    pub(crate) fn terminal(&self) -> Outcome {
        self.lock_inner().terminal.clone()
    }

    /// Logger attached to this coordinator.
    pub fn log(&self) -> Arc<dyn LifeLog> {
        self.lock_inner().log.clone()
    }

    // ---------------------------
    // Signals
    // ---------------------------

    /// Signal closed as soon as shutdown has begun and deferral is no longer
    /// possible.
    pub fn shutdown_started(&self) -> Signaled {
        self.core.shutdown_started.subscribe()
    }

    /// Signal closed when the shutdown hook has returned. The terminal
    /// outcome is final from this point; dependents may still be running.
    pub fn local_shutdown_done(&self) -> Signaled {
        self.core.local_shutdown_done.subscribe()
    }

    /// Signal closed when shutdown is completely done, dependents included.
    pub fn shutdown_done(&self) -> Signaled {
        self.core.shutdown_done.subscribe()
    }

    // ---------------------------
    // Setters (frozen as the lifecycle advances)
    // ---------------------------

    /// Replaces the shutdown hook.
    ///
    /// Fails with [`LifecycleError::HandlerFrozen`] once activation has
    /// completed (or shutdown has begun).
    pub fn set_shutdown_handler<F, Fut>(&self, hook: F) -> Result<(), LifecycleError>
    where
        F: FnOnce(Outcome) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Outcome> + Send + 'static,
    {
        let boxed: ShutdownFn = Box::new(move |advisory| Box::pin(hook(advisory)));
        let mut inner = self.lock_inner();
        if inner.state >= State::Activated {
            return Err(LifecycleError::HandlerFrozen);
        }
        inner.handler = Some(ShutdownHandler::Callback(boxed));
        Ok(())
    }

    /// Replaces the logger.
    ///
    /// Only allowed while unactivated: background tasks clone the logger they
    /// were born with, so replacement after activation begins would race them.
    pub fn set_log(&self, log: impl LifeLog) -> Result<(), LifecycleError> {
        let mut inner = self.lock_inner();
        if inner.state > State::Unactivated {
            return Err(LifecycleError::LogFrozen);
        }
        inner.log = Arc::new(log);
        self.core.wg.set_log(inner.log.clone());
        Ok(())
    }

    // ---------------------------
    // Deferral gate
    // ---------------------------

    /// Increments the shutdown defer count, preventing a scheduled shutdown
    /// from *starting* (scheduling itself is always accepted).
    ///
    /// Fails once shutdown has started. Every successful call must pair with
    /// exactly one [`undefer_shutdown`](Coordinator::undefer_shutdown).
    pub fn defer_shutdown(&self) -> Result<(), LifecycleError> {
        let mut inner = self.lock_inner();
        if inner.state.is_started_shutdown() {
            return Err(LifecycleError::ShutdownStarted);
        }
        inner.defer_count += 1;
        Ok(())
    }

    /// Decrements the shutdown defer count; if it reaches zero with a
    /// shutdown scheduled, shutdown begins before this method returns.
    ///
    /// An unpaired undefer is a bug and is reported as fatal.
    pub fn undefer_shutdown(&self) {
        let begin = {
            let mut inner = self.lock_inner();
            if inner.defer_count == 0 {
                inner.log.fatal("undefer_shutdown without matching defer_shutdown");
            }
            inner.defer_count -= 1;
            let begin =
                inner.defer_count == 0 && inner.scheduled && !inner.state.is_started_shutdown();
            if begin {
                self.advance(&mut inner, State::ShuttingDown);
            }
            begin
        };
        if begin {
            self.spawn_shutdown_driver();
        }
    }

    // ---------------------------
    // Scheduling and driving shutdown
    // ---------------------------

    /// Schedules asynchronous shutdown with `advisory` as the advisory
    /// outcome. Returns true iff this call was the first scheduler; repeat
    /// calls have no effect.
    ///
    /// If shutdown is deferred, only the *intent* is latched here; the
    /// shutdown itself begins when the deferral gate drains.
    pub fn start_shutdown(&self, advisory: Outcome) -> bool {
        let (first, begin) = {
            let mut inner = self.lock_inner();
            if inner.scheduled {
                (false, false)
            } else {
                if inner.state.is_started_shutdown() {
                    inner.log.fatal("shutdown started before being scheduled");
                }
                inner.scheduled = true;
                inner.terminal = advisory;
                let begin = inner.defer_count == 0;
                if begin {
                    self.advance(&mut inner, State::ShuttingDown);
                }
                (true, begin)
            }
        };
        if begin {
            self.spawn_shutdown_driver();
        }
        first
    }

    /// Runs the remainder of shutdown in its own task: hook, local-shutdown,
    /// wait-group drain, terminal state. Called exactly once, by whichever
    /// call performed the transition into shutting-down.
    pub(crate) fn spawn_shutdown_driver(&self) {
        let me = self.clone();
        tokio::spawn(async move {
            let (handler, advisory, log) = {
                let mut inner = me.lock_inner();
                (inner.handler.take(), inner.terminal.clone(), inner.log.clone())
            };
            let result = match handler {
                Some(h) => h.run(advisory).await,
                // construction guarantees a handler and the driver runs once
                None => log.fatal("shutdown driver found no handler"),
            };

            {
                let mut inner = me.lock_inner();
                inner.terminal = result;
                me.advance(&mut inner, State::LocalShutdown);
            }
            log.debug("local shutdown done; waiting for dependents");

            // A dependent registered between the drain and the lock below
            // would be stranded; re-check under the lock and keep waiting
            // until the group is empty at transition time.
            loop {
                me.core.wg.wait().await;
                let mut inner = me.lock_inner();
                if me.core.wg.holds() > 0 {
                    continue;
                }
                me.advance(&mut inner, State::ShutDown);
                break;
            }
            log.debug("shutdown done");
        });
    }

    // ---------------------------
    // Waits and synchronous wrappers
    // ---------------------------

    /// Waits for local shutdown (the hook has returned) and returns the
    /// terminal outcome. Does not initiate shutdown.
    ///
    /// The caller must not hold a deferral that cannot be released
    /// concurrently, or this never completes.
    pub async fn wait_local_shutdown(&self) -> Outcome {
        self.core.local_shutdown_done.wait().await;
        self.terminal()
    }

    /// Waits for complete shutdown (dependents included) and returns the
    /// terminal outcome. Does not initiate shutdown.
    ///
    /// Every caller receives the same outcome, regardless of arrival order.
    /// The caller must not hold a deferral that cannot be released
    /// concurrently, or this never completes.
    pub async fn wait_shutdown(&self) -> Outcome {
        self.core.shutdown_done.wait().await;
        self.terminal()
    }

    /// Synchronous local shutdown: schedules with `advisory`, waits for the
    /// hook to return, and returns the terminal outcome. Dependents may still
    /// be shutting down.
    pub async fn local_shutdown(&self, advisory: Outcome) -> Outcome {
        self.start_shutdown(advisory);
        self.wait_local_shutdown().await
    }

    /// Synchronous shutdown: schedules with `advisory`, waits for completion
    /// (dependents included), and returns the terminal outcome.
    pub async fn shutdown(&self, advisory: Outcome) -> Outcome {
        self.start_shutdown(advisory);
        self.wait_shutdown().await
    }

    /// Shuts down with a clean advisory outcome.
    ///
    /// Safe to call any number of times; every caller receives the same
    /// terminal outcome.
    pub async fn close(&self) -> Outcome {
        self.shutdown(Ok(())).await
    }

    // ---------------------------
    // Undefer wrappers (guard/cleanup positions)
    // ---------------------------

    /// Releases one deferral and schedules shutdown. Returns true iff this
    /// call was the first scheduler.
    pub fn undefer_and_start_shutdown(&self, advisory: Outcome) -> bool {
        let first = self.start_shutdown(advisory);
        self.undefer_shutdown();
        first
    }

    /// Releases one deferral, schedules shutdown, and waits for local
    /// shutdown. Returns the terminal outcome.
    pub async fn undefer_and_local_shutdown(&self, advisory: Outcome) -> Outcome {
        self.undefer_and_start_shutdown(advisory);
        self.wait_local_shutdown().await
    }

    /// Releases one deferral, schedules shutdown, and waits for complete
    /// shutdown. Returns the terminal outcome.
    pub async fn undefer_and_shutdown(&self, advisory: Outcome) -> Outcome {
        self.undefer_and_start_shutdown(advisory);
        self.wait_shutdown().await
    }

    /// Releases one deferral and waits for local shutdown without initiating
    /// it: for following the natural life of the object.
    pub async fn undefer_and_wait_local_shutdown(&self) -> Outcome {
        self.undefer_shutdown();
        self.wait_local_shutdown().await
    }

    /// Releases one deferral and waits for complete shutdown without
    /// initiating it.
    pub async fn undefer_and_wait_shutdown(&self) -> Outcome {
        self.undefer_shutdown();
        self.wait_shutdown().await
    }

    /// Releases one deferral; if activation never succeeded, schedules
    /// shutdown with `advisory` and (when `wait_on_fail`) waits for local
    /// shutdown. Returns `Ok` when activated.
    pub async fn undefer_and_local_shutdown_if_not_activated(
        &self,
        advisory: Outcome,
        wait_on_fail: bool,
    ) -> Outcome {
        let activated = self.is_activated();
        if !activated {
            self.start_shutdown(advisory.clone());
        }
        self.undefer_shutdown();
        if activated {
            Ok(())
        } else if wait_on_fail {
            self.wait_local_shutdown().await
        } else {
            advisory
        }
    }

    /// Releases one deferral; if activation never succeeded, schedules
    /// shutdown with `advisory` and (when `wait_on_fail`) waits for complete
    /// shutdown. Returns `Ok` when activated.
    pub async fn undefer_and_shutdown_if_not_activated(
        &self,
        advisory: Outcome,
        wait_on_fail: bool,
    ) -> Outcome {
        let activated = self.is_activated();
        if !activated {
            self.start_shutdown(advisory.clone());
        }
        self.undefer_shutdown();
        if activated {
            Ok(())
        } else if wait_on_fail {
            self.wait_shutdown().await
        } else {
            advisory
        }
    }

    // ---------------------------
    // Activation latch and lock renting
    // ---------------------------

    /// Latches the activated flag if shutdown has not started yet.
    ///
    /// Intended for objects with trivial construct-time activation that
    /// completes before the object is ever shared; asynchronous activation
    /// should go through [`activate`](Coordinator::activate) /
    /// [`activate_with`](Coordinator::activate_with) instead, which call
    /// this on hook success. Idempotent once activated.
    pub fn set_activated(&self) -> Result<(), LifecycleError> {
        let mut inner = self.lock_inner();
        if self.is_activated() {
            return Ok(());
        }
        if inner.state.is_started_shutdown() {
            return Err(LifecycleError::ShutdownBeforeActivation);
        }
        if inner.state == State::Unactivated {
            self.advance(&mut inner, State::Activating);
        }
        self.advance(&mut inner, State::Activated);
        Ok(())
    }

    /// Runs `f` while holding the coordinator's coarse mutex, for embedder
    /// critical sections that must be serialized with lifecycle transitions.
    ///
    /// `f` must not call back into this coordinator: every transition method
    /// takes the same (non-reentrant) lock.
    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.lock_inner();
        f()
    }
}

impl AsyncShutdown for Coordinator {
    fn start_shutdown(&self, advisory: Outcome) -> bool {
        Coordinator::start_shutdown(self, advisory)
    }

    fn done_signal(&self) -> Signaled {
        self.shutdown_done()
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("Coordinator")
            .field("state", &inner.state.as_label())
            .field("scheduled", &inner.scheduled)
            .field("defer_count", &inner.defer_count)
            .field("activated", &self.is_activated())
            .finish()
    }
}
