//! # Dependent registry: children torn down as part of shutdown.
//!
//! Each registration takes one hold on the termination wait-group and spawns
//! a monitor task that releases it when the child is done:
//!
//! ```text
//! add_child_done(fut)          wait fut ───────────────────────────► release
//! add_shutdown_child(child)    wait child-done OR local-shutdown-done
//!                                └─ on local-shutdown-done first:
//!                                   child.start_shutdown(terminal), wait child-done
//! add_close_child(child)       wait local-shutdown-done, close()  ──► release
//! ```
//!
//! Children shut down concurrently; there is no ordering among them, and
//! their own outcomes are deliberately discarded. Registration fails only
//! once the terminal state has been reached.
//!
//! [`Coordinator::shutdown_on_cancel`] is the inverse direction: it bounds
//! this coordinator's lifetime to an external cancellation source.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{Fault, LifecycleError};
use crate::hooks::{AsyncShutdown, Closer};
use crate::state::State;
use crate::waitgroup::WaitGroup;
use crate::Coordinator;

impl Coordinator {
    /// Adds `delta` holds to the termination wait-group and returns a handle
    /// for releasing them.
    ///
    /// The wait-group does not delay local shutdown, only the terminal
    /// state. Fails once the terminal state has been reached; a zero delta
    /// is a programmer error and is reported as fatal.
    pub fn shutdown_wg_add(&self, delta: usize) -> Result<WaitGroup, LifecycleError> {
        let inner = self.lock_inner();
        if delta == 0 {
            inner.log.fatal("shutdown_wg_add with zero delta");
        }
        if inner.state >= State::ShutDown {
            return Err(LifecycleError::RegistryClosed);
        }
        self.core.wg.add(delta);
        Ok(self.core.wg.clone())
    }

    /// Registers an opaque done-signal: final shutdown completes only after
    /// `done` resolves. The coordinator takes no action to make it resolve;
    /// that is the caller's responsibility.
    pub fn add_child_done<F>(&self, done: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let wg = self.shutdown_wg_add(1)?;
        tokio::spawn(async move {
            done.await;
            wg.done();
        });
        Ok(())
    }

    /// Registers a shutdown-aware child. After local shutdown, the child is
    /// scheduled with this coordinator's terminal outcome as the advisory
    /// value and waited for; if the child finishes on its own first, nothing
    /// is done. The child's own outcome is discarded.
    pub fn add_shutdown_child(&self, child: Arc<dyn AsyncShutdown>) -> Result<(), LifecycleError> {
        let wg = self.shutdown_wg_add(1)?;
        let me = self.clone();
        tokio::spawn(async move {
            let done = child.done_signal();
            tokio::select! {
                // already shut down by someone else; no reason to keep waiting
                _ = done.wait() => {}
                _ = me.core.local_shutdown_done.wait() => {
                    child.start_shutdown(me.terminal());
                    done.wait().await;
                }
            }
            wg.done();
        });
        Ok(())
    }

    /// Registers a close-aware child, closed in its own task after local
    /// shutdown, in parallel with other children. Close errors are logged,
    /// not propagated.
    pub fn add_close_child(&self, child: Arc<dyn Closer>) -> Result<(), LifecycleError> {
        let wg = self.shutdown_wg_add(1)?;
        let me = self.clone();
        tokio::spawn(async move {
            me.core.local_shutdown_done.wait().await;
            let log = me.log();
            log.trace("local shutdown done; closing child");
            if let Err(e) = child.close().await {
                log.error(&format!("child close failed: {e}"));
            }
            wg.done();
        });
        Ok(())
    }

    /// Bounds this coordinator's lifetime to a cancellation source: if
    /// `token` is cancelled before shutdown starts, shutdown is scheduled
    /// with `cause`. Does not block; the monitor task exits as soon as
    /// either side fires.
    pub fn shutdown_on_cancel(&self, token: CancellationToken, cause: Fault) {
        let me = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = me.core.shutdown_started.wait() => {}
                _ = token.cancelled() => {
                    me.start_shutdown(Err(cause));
                }
            }
        });
    }
}
