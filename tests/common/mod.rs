//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lifevisor::{fault, Coordinator, Fault, Outcome};

/// Minimal application error for driving fault paths.
#[derive(Debug)]
pub struct Boom(pub &'static str);

impl fmt::Display for Boom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Boom {}

pub fn boom(tag: &'static str) -> Fault {
    fault(Boom(tag))
}

/// Error message of an outcome, or empty for `Ok`.
pub fn msg(outcome: &Outcome) -> String {
    match outcome {
        Ok(()) => String::new(),
        Err(e) => e.to_string(),
    }
}

/// Coordinator whose shutdown hook passes the advisory outcome through,
/// counting invocations.
pub fn pass_through() -> (Coordinator, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counted = runs.clone();
    let coord = Coordinator::builder()
        .on_shutdown(move |advisory: Outcome| async move {
            counted.fetch_add(1, Ordering::SeqCst);
            advisory
        })
        .build()
        .expect("shutdown hook provided");
    (coord, runs)
}

/// Coordinator whose shutdown hook discards the advisory outcome and settles
/// on the given terminal fault.
pub fn settles_on(terminal: Fault) -> (Coordinator, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counted = runs.clone();
    let coord = Coordinator::builder()
        .on_shutdown(move |_advisory: Outcome| async move {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(terminal)
        })
        .build()
        .expect("shutdown hook provided");
    (coord, runs)
}
