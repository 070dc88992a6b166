//! # Logger capability.
//!
//! The coordinator does not pick a logging backend; it accepts any
//! [`LifeLog`] implementation and calls it for leveled diagnostics and for
//! fatal misuse reports. [`NopLog`] (the default) discards everything.
//!
//! The built-in [`TracingLog`], exported behind the `logging` feature,
//! forwards to the `tracing` macros.
//!
//! ## Fatal reports
//!
//! [`LifeLog::fatal`] is reserved for programmer errors the coordinator
//! cannot recover from: an unbalanced undefer, an illegal state edge, a
//! wait-group released below zero. Implementations must not return; the
//! provided implementations log and then panic.

/// Leveled log output plus a fatal-error reporter.
///
/// Implementations must be cheap to call from synchronous code: the
/// coordinator may log while holding its internal lock.
pub trait LifeLog: Send + Sync + 'static {
    /// Fine-grained diagnostic output.
    fn trace(&self, _msg: &str) {}

    /// Debug-level output.
    fn debug(&self, _msg: &str) {}

    /// Warning-level output.
    fn warn(&self, _msg: &str) {}

    /// Error-level output.
    fn error(&self, _msg: &str) {}

    /// Reports an unrecoverable coordinator misuse and aborts the flow.
    ///
    /// Must not return.
    fn fatal(&self, msg: &str) -> ! {
        panic!("lifevisor fatal: {msg}");
    }
}

/// Logger that discards all output. The default for new coordinators.
pub struct NopLog;

impl LifeLog for NopLog {}

/// Logger backed by the [`tracing`] macros.
///
/// Enabled via the `logging` feature.
#[cfg(feature = "logging")]
pub struct TracingLog;

#[cfg(feature = "logging")]
impl LifeLog for TracingLog {
    fn trace(&self, msg: &str) {
        tracing::trace!(target: "lifevisor", "{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!(target: "lifevisor", "{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "lifevisor", "{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "lifevisor", "{msg}");
    }

    fn fatal(&self, msg: &str) -> ! {
        tracing::error!(target: "lifevisor", "fatal: {msg}");
        panic!("lifevisor fatal: {msg}");
    }
}
