//! # Error types used by the lifecycle coordinator.
//!
//! Two kinds of failure flow through this crate:
//!
//! - [`LifecycleError`] contract violations returned by coordinator methods
//!   (deferring too late, registering a child after teardown, and so on).
//! - [`Fault`] / [`Outcome`] application-supplied terminal errors: the value
//!   the shutdown hook settles on and every waiter receives.
//!
//! [`LifecycleError`] provides `as_label` for logs/metrics. Misuse bugs
//! (unbalanced deferrals, illegal state edges) are *not* represented here;
//! those go through [`LifeLog::fatal`](crate::LifeLog::fatal).

use std::sync::Arc;

use thiserror::Error;

/// A shared, cloneable application error.
///
/// Terminal and advisory errors are arbitrary values owned by the embedding
/// application; the coordinator only stores and broadcasts them, so they are
/// carried behind an `Arc`.
pub type Fault = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A completion value: `Ok(())` for a clean outcome, `Err` for a fault.
///
/// Cloneable, so the same value can be handed to every shutdown waiter.
pub type Outcome = Result<(), Fault>;

/// Wraps any application error into a [`Fault`].
pub fn fault<E>(err: E) -> Fault
where
    E: std::error::Error + Send + Sync + 'static,
{
    Arc::new(err)
}

/// # Contract violations reported by the coordinator.
///
/// These are recoverable at the call site: the caller raced a transition and
/// lost, or used a setter past the point where it became read-only.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Shutdown has already started; the deferral gate is closed.
    #[error("shutdown already started; cannot defer")]
    ShutdownStarted,

    /// Activation cannot proceed because shutdown was scheduled first.
    ///
    /// This is the diagnostic handed to blocked activators; the terminal
    /// outcome of the shutdown is never substituted for it.
    #[error("shutdown already started; cannot activate")]
    ShutdownBeforeActivation,

    /// The shutdown handler can no longer be replaced (activation has completed).
    #[error("cannot replace shutdown handler after activation")]
    HandlerFrozen,

    /// The logger can no longer be replaced (activation has begun).
    #[error("cannot replace logger after activation has begun")]
    LogFrozen,

    /// The terminal state has been reached; no more children or wait-group
    /// participants can be registered.
    #[error("shutdown already complete; cannot register dependent")]
    RegistryClosed,

    /// Construction was attempted without any shutdown capability.
    #[error("no shutdown handler: provide a callback or a OnceShutdown object")]
    NoShutdownHandler,
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::ShutdownStarted => "shutdown_started",
            LifecycleError::ShutdownBeforeActivation => "shutdown_before_activation",
            LifecycleError::HandlerFrozen => "handler_frozen",
            LifecycleError::LogFrozen => "log_frozen",
            LifecycleError::RegistryClosed => "registry_closed",
            LifecycleError::NoShutdownHandler => "no_shutdown_handler",
        }
    }
}
