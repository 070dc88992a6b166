//! # Capability interfaces for managed objects and dependent children.
//!
//! The coordinator never inspects the object it manages; it reaches it only
//! through narrow capabilities:
//!
//! - [`OnceActivate`] / [`OnceShutdown`] the managed object's activation and
//!   shutdown hooks, resolved when no explicit callback was supplied.
//! - [`AsyncShutdown`] a shutdown-aware dependent child (schedule + done
//!   signal). [`Coordinator`](crate::Coordinator) implements this itself, so
//!   coordinators compose into trees.
//! - [`Closer`] a dependent child with a single close operation.
//!
//! Each hook is invoked at most once, without the coordinator lock held.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::Outcome;
use crate::signal::Signaled;

/// Activation capability of a managed object.
///
/// Called exactly once, in the activating state, with shutdown deferred.
/// Returning `Err` aborts activation and immediately schedules shutdown with
/// that fault. The hook must not wait for shutdown or call any synchronous
/// shutdown wrapper: shutdown cannot begin while it runs, so doing so
/// deadlocks.
#[async_trait]
pub trait OnceActivate: Send + Sync + 'static {
    async fn handle_once_activate(&self) -> Outcome;
}

/// Shutdown capability of a managed object.
///
/// Called exactly once, in the shutting-down state, in its own task. It
/// receives the advisory outcome that scheduled the shutdown, performs the
/// actual teardown, and returns the real completion value; the return value
/// becomes the terminal outcome every waiter observes.
///
/// Never called while shutdown is deferred, and therefore never during
/// activation.
#[async_trait]
pub trait OnceShutdown: Send + Sync + 'static {
    async fn handle_once_shutdown(&self, advisory: Outcome) -> Outcome;
}

/// A shutdown-aware dependent child.
///
/// After the parent's local shutdown, the parent schedules each registered
/// child with its own terminal outcome as the advisory value, then waits on
/// the child's done signal. The child's final outcome is deliberately
/// discarded.
///
/// # Example
/// ```
/// use lifevisor::Coordinator;
///
/// fn nest(parent: &Coordinator, child: Coordinator) {
///     // a Coordinator is itself an AsyncShutdown child
///     parent.add_shutdown_child(std::sync::Arc::new(child)).unwrap();
/// }
/// ```
pub trait AsyncShutdown: Send + Sync + 'static {
    /// Schedules shutdown with an advisory outcome. Returns true iff this
    /// call was the first scheduler. Must not block.
    fn start_shutdown(&self, advisory: Outcome) -> bool;

    /// Signal closed when the child's shutdown is fully complete.
    fn done_signal(&self) -> Signaled;
}

/// A dependent child with a single close operation.
///
/// Closed in its own task after the parent's local shutdown, in parallel
/// with other children. Close errors are logged, never propagated.
#[async_trait]
pub trait Closer: Send + Sync + 'static {
    async fn close(&self) -> Outcome;
}

/// Boxed one-shot activation callback.
pub(crate) type ActivateFn = Box<dyn FnOnce() -> BoxFuture<'static, Outcome> + Send>;

/// Boxed one-shot shutdown callback.
pub(crate) type ShutdownFn = Box<dyn FnOnce(Outcome) -> BoxFuture<'static, Outcome> + Send>;

/// The shutdown hook slot: an explicit callback, or the managed object's
/// [`OnceShutdown`] capability. Taken exactly once by the shutdown driver.
pub(crate) enum ShutdownHandler {
    Callback(ShutdownFn),
    Object(std::sync::Arc<dyn OnceShutdown>),
}

impl ShutdownHandler {
    pub(crate) async fn run(self, advisory: Outcome) -> Outcome {
        match self {
            ShutdownHandler::Callback(f) => f(advisory).await,
            ShutdownHandler::Object(obj) => obj.handle_once_shutdown(advisory).await,
        }
    }
}
