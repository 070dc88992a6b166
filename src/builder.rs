//! # Builder for constructing a [`Coordinator`].
//!
//! Construction is where the capability set is checked: a coordinator cannot
//! exist without a shutdown hook, so [`build`](CoordinatorBuilder::build)
//! rejects a builder that was given neither an
//! [`on_shutdown`](CoordinatorBuilder::on_shutdown) callback nor a
//! [`shutdowner`](CoordinatorBuilder::shutdowner) object. Missing
//! capabilities are a construction-time error, not a first-use surprise.

use std::future::Future;
use std::sync::Arc;

use crate::error::{LifecycleError, Outcome};
use crate::hooks::{OnceActivate, OnceShutdown, ShutdownFn, ShutdownHandler};
use crate::log::{LifeLog, NopLog};
use crate::Coordinator;

/// Builder for a [`Coordinator`] with optional capabilities.
pub struct CoordinatorBuilder {
    log: Arc<dyn LifeLog>,
    activator: Option<Arc<dyn OnceActivate>>,
    handler: Option<ShutdownHandler>,
}

impl CoordinatorBuilder {
    pub(crate) fn new() -> Self {
        Self {
            log: Arc::new(NopLog),
            activator: None,
            handler: None,
        }
    }

    /// Sets the logger. Defaults to [`NopLog`].
    pub fn log(mut self, log: impl LifeLog) -> Self {
        self.log = Arc::new(log);
        self
    }

    /// Sets the managed object's activation capability, used by
    /// [`Coordinator::activate`] when no explicit hook is supplied.
    pub fn activator(mut self, obj: Arc<dyn OnceActivate>) -> Self {
        self.activator = Some(obj);
        self
    }

    /// Sets the managed object's shutdown capability.
    ///
    /// Mutually satisfying with [`on_shutdown`](CoordinatorBuilder::on_shutdown);
    /// whichever is set last wins.
    pub fn shutdowner(mut self, obj: Arc<dyn OnceShutdown>) -> Self {
        self.handler = Some(ShutdownHandler::Object(obj));
        self
    }

    /// Sets an explicit shutdown callback.
    ///
    /// The callback receives the advisory outcome, performs the actual
    /// teardown, and returns the real terminal outcome.
    pub fn on_shutdown<F, Fut>(mut self, hook: F) -> Self
    where
        F: FnOnce(Outcome) -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let boxed: ShutdownFn = Box::new(move |advisory| Box::pin(hook(advisory)));
        self.handler = Some(ShutdownHandler::Callback(boxed));
        self
    }

    /// Builds the coordinator, in the unactivated state.
    ///
    /// Fails with [`LifecycleError::NoShutdownHandler`] when no shutdown
    /// capability was provided.
    pub fn build(self) -> Result<Coordinator, LifecycleError> {
        let handler = self.handler.ok_or(LifecycleError::NoShutdownHandler)?;
        Ok(Coordinator::new_internal(self.log, self.activator, handler))
    }
}
