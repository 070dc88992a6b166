//! # lifevisor
//!
//! **Lifevisor** is a lightweight asynchronous lifecycle coordination library.
//!
//! It provides an embeddable [`Coordinator`]: a race-free state machine for
//! one-shot activation, scheduled (and deferrable) shutdown, and the orderly
//! teardown of dependent resources. It is designed as a building block for
//! long-lived objects (services, connections, supervisors) with an async
//! startup phase, a running phase, and a multi-step shutdown phase that
//! cascades across children and background tasks.
//!
//! ## Features
//!
//! | Area            | Description                                                            | Key types / traits                   |
//! |-----------------|------------------------------------------------------------------------|--------------------------------------|
//! | **Lifecycle**   | Monotone six-state machine with race-free transitions.                 | [`Coordinator`], [`State`]           |
//! | **Activation**  | At-most-once activation hook; concurrent callers share one result.     | [`OnceActivate`]                     |
//! | **Shutdown**    | Scheduled, deferrable, at-most-once shutdown hook; broadcast outcome.  | [`OnceShutdown`], [`Outcome`]        |
//! | **Dependents**  | Children torn down concurrently before shutdown completes.             | [`AsyncShutdown`], [`Closer`]        |
//! | **Signals**     | One-shot broadcasts for every lifecycle milestone.                     | [`Signal`], [`Signaled`]             |
//! | **Errors**      | Typed contract violations plus shared application faults.              | [`LifecycleError`], [`Fault`]        |
//! | **Logging**     | Pluggable logger capability with a fatal reporter.                     | [`LifeLog`], [`NopLog`]              |
//!
//! ## Optional features
//! - `logging`: exports `TracingLog`, a logger backed by the `tracing` crate.
//!
//! ```
//! use lifevisor::{Coordinator, Outcome};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let coord = Coordinator::builder()
//!         .on_shutdown(|advisory: Outcome| async move {
//!             // tear down for real, then settle the terminal outcome
//!             advisory
//!         })
//!         .build()
//!         .expect("a shutdown hook was provided");
//!
//!     // One-shot activation; concurrent callers would share this result.
//!     let activated = coord.activate_with(|| async { Ok(()) }, false).await;
//!     assert!(activated.is_ok());
//!     assert!(coord.is_activated());
//!
//!     // Synchronous shutdown: schedules, runs the hook once, waits for
//!     // dependents, returns the terminal outcome to every caller.
//!     assert!(coord.close().await.is_ok());
//!     assert!(coord.is_done_shutdown());
//! }
//! ```
//!
//! ---

mod activate;
mod builder;
mod children;
mod coordinator;
mod error;
mod hooks;
mod log;
mod signal;
mod state;
mod waitgroup;

// ---- Public re-exports ----

pub use builder::CoordinatorBuilder;
pub use coordinator::Coordinator;
pub use error::{fault, Fault, LifecycleError, Outcome};
pub use hooks::{AsyncShutdown, Closer, OnceActivate, OnceShutdown};
pub use log::{LifeLog, NopLog};
pub use signal::{Signal, Signaled};
pub use state::State;
pub use waitgroup::WaitGroup;

// Optional: expose the tracing-backed logger.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use log::TracingLog;
