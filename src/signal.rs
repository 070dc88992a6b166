//! # One-shot broadcast signal.
//!
//! [`Signal`] is a thin wrapper around [`tokio_util::sync::CancellationToken`]
//! that models a latch: initially open, closed exactly once, thereafter
//! permanently observable as closed by any number of waiters.
//!
//! - [`Signal::close`] closes the latch (idempotent).
//! - [`Signal::subscribe`] hands out a read-only [`Signaled`] half.
//!
//! The coordinator publishes its lifecycle notifications
//! (shutdown-started, local-shutdown-done, shutdown-done) as [`Signaled`]
//! handles, so observers can wait but never close. Waiting on an
//! already-closed signal completes immediately.
//!
//! # Example
//! ```
//! use lifevisor::Signal;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let sig = Signal::new();
//! let seen = sig.subscribe();
//!
//! assert!(!seen.is_closed());
//! sig.close();
//! seen.wait().await; // completes immediately
//! assert!(seen.is_closed());
//! # }
//! ```

use tokio_util::sync::CancellationToken;

/// Owning half of a one-shot broadcast: can close, exactly once.
pub struct Signal {
    token: CancellationToken,
}

impl Signal {
    /// Creates a new, open signal.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Closes the signal, waking every current and future waiter.
    ///
    /// Closing an already-closed signal is a no-op.
    pub fn close(&self) {
        self.token.cancel();
    }

    /// True once the signal has been closed.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns a read-only observer half.
    pub fn subscribe(&self) -> Signaled {
        Signaled {
            token: self.token.clone(),
        }
    }

    /// Waits until the signal is closed.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only half of a [`Signal`]: waitable, cloneable, cannot close.
#[derive(Clone)]
pub struct Signaled {
    token: CancellationToken,
}

impl Signaled {
    /// True once the signal has been closed.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the signal is closed.
    ///
    /// Completes immediately when the signal is already closed; never blocks
    /// on a closed signal.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Waits until the signal is closed, consuming the handle.
    ///
    /// Useful where a `'static` future is needed, e.g. as an opaque
    /// done-signal for [`Coordinator::add_child_done`](crate::Coordinator::add_child_done).
    pub async fn wait_owned(self) {
        self.token.cancelled_owned().await;
    }
}
