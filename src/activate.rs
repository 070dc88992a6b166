//! # One-shot activation driver.
//!
//! Activation runs the managed object's activation hook at most once, with
//! shutdown implicitly deferred for the duration of the hook:
//!
//! ```text
//! activate()/activate_with()
//!   ├─ already activated            → Ok
//!   ├─ another activation in flight → wait for it, re-check
//!   ├─ shutdown already started     → Err(ShutdownBeforeActivation)
//!   └─ otherwise:
//!        defer shutdown, state → Activating, run hook (lock released)
//!        ├─ hook Ok  → latch activated (unless shutdown raced in)
//!        └─ hook Err → schedule shutdown with that fault
//!        undefer shutdown  (a pending shutdown begins here)
//! ```
//!
//! Every concurrent caller completes when the first caller completes, with
//! the same result. A failed activation drives the state directly to
//! shutting-down without ever passing through activated.

use std::future::Future;
use std::sync::Arc;

use crate::error::{fault, LifecycleError, Outcome};
use crate::hooks::{ActivateFn, OnceActivate};
use crate::state::State;
use crate::Coordinator;

impl Coordinator {
    /// Activates through the managed object's
    /// [`OnceActivate`](crate::OnceActivate) capability.
    ///
    /// Calling this on a coordinator built without an activator is a
    /// programmer error and is reported as fatal.
    ///
    /// See [`activate_with`](Coordinator::activate_with) for the full
    /// contract.
    pub async fn activate(&self, wait_on_fail: bool) -> Outcome {
        self.do_once_activate(None, wait_on_fail).await
    }

    /// Activates by running `hook`, at most once across all callers.
    ///
    /// On success the object is fully activated (though a shutdown may
    /// already be scheduled). On failure shutdown has been scheduled with the
    /// hook's fault, and (when `wait_on_fail` is set) has completed by the
    /// time this returns.
    ///
    /// ### Rules
    /// - Safe to call repeatedly and concurrently: one hook run, everyone
    ///   gets the first caller's result.
    /// - While the hook runs, shutdown is deferred. The hook must not wait
    ///   for shutdown or call a synchronous shutdown wrapper; that deadlocks.
    /// - When shutdown wins the race, the error is always
    ///   [`LifecycleError::ShutdownBeforeActivation`]; the shutdown's own
    ///   terminal outcome is never substituted.
    /// - With `wait_on_fail`, the caller must not hold a deferral that
    ///   cannot be released concurrently.
    pub async fn activate_with<F, Fut>(&self, hook: F, wait_on_fail: bool) -> Outcome
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let boxed: ActivateFn = Box::new(move || Box::pin(hook()));
        self.do_once_activate(Some(boxed), wait_on_fail).await
    }

    async fn do_once_activate(&self, hook: Option<ActivateFn>, wait_on_fail: bool) -> Outcome {
        let in_flight = {
            let inner = self.lock_inner();
            if self.is_activated() {
                return Ok(());
            }
            inner.state == State::Activating
        };
        if in_flight {
            // someone else is activating; wait for the phase to end before
            // deciding what to do next
            self.core.activation_done.wait().await;
        }

        enum NextStep {
            ShutdownBeforeActivation,
            Proceed(Option<Arc<dyn OnceActivate>>),
        }

        let next_step = {
            let mut inner = self.lock_inner();
            if self.is_activated() {
                return Ok(());
            }
            if inner.state.is_started_shutdown() {
                NextStep::ShutdownBeforeActivation
            } else {
                // implicit deferral for the duration of the hook
                inner.defer_count += 1;
                self.advance(&mut inner, State::Activating);
                NextStep::Proceed(inner.activator.clone())
            }
        };
        let activator = match next_step {
            NextStep::ShutdownBeforeActivation => {
                if wait_on_fail {
                    let _ = self.wait_shutdown().await;
                }
                return Err(fault(LifecycleError::ShutdownBeforeActivation));
            }
            NextStep::Proceed(activator) => activator,
        };

        let result = match hook {
            Some(f) => f().await,
            None => match activator {
                Some(obj) => obj.handle_once_activate().await,
                None => self
                    .log()
                    .fatal("activate() on a coordinator built without an activator"),
            },
        };

        let result = match result {
            // the latch can still lose to a shutdown scheduled mid-hook
            Ok(()) => self.set_activated().map_err(fault),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            self.start_shutdown(Err(e.clone()));
        }

        // pairs with the implicit deferral above; a pending shutdown begins here
        self.undefer_shutdown();

        if result.is_err() && wait_on_fail {
            let _ = self.wait_shutdown().await;
        }
        result
    }
}
