//! # Lifecycle states of a [`Coordinator`](crate::Coordinator).
//!
//! [`State`] is a monotone enumeration: during transitions the state only
//! ever moves to a higher ordinal. The full path is
//! `Unactivated → Activating → Activated → ShuttingDown → LocalShutdown → ShutDown`,
//! but `Activating` and `Activated` are skipped when shutdown is scheduled
//! before any activation attempt.
//!
//! # Example
//! ```
//! use lifevisor::State;
//!
//! assert!(State::Unactivated < State::ShuttingDown);
//! assert!(State::ShutDown.is_started_shutdown());
//! assert!(!State::Activated.is_started_shutdown());
//! ```

/// A discrete state in the coordinator lifecycle.
///
/// Ordering is meaningful: comparisons like `state >= State::ShuttingDown`
/// are how observers ask "has shutdown begun".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum State {
    /// No activation attempt has been made yet.
    Unactivated,
    /// The activation hook is running; shutdown is implicitly deferred.
    Activating,
    /// Activation succeeded. A shutdown may already be scheduled but has not begun.
    Activated,
    /// Shutdown has begun; deferral is no longer possible and the shutdown
    /// hook may be running.
    ShuttingDown,
    /// The shutdown hook has returned and the terminal outcome is final;
    /// dependent children are still being torn down.
    LocalShutdown,
    /// All children and wait-group participants have released. Quiescent.
    ShutDown,
}

impl State {
    /// True once shutdown has begun (state ≥ [`State::ShuttingDown`]).
    pub fn is_started_shutdown(self) -> bool {
        self >= State::ShuttingDown
    }

    /// True once the shutdown hook has returned and the terminal outcome is final.
    pub fn is_done_local_shutdown(self) -> bool {
        self >= State::LocalShutdown
    }

    /// True once shutdown is fully complete, including dependents.
    pub fn is_done_shutdown(self) -> bool {
        self >= State::ShutDown
    }

    /// Whether a direct transition `self → to` is part of the lifecycle.
    ///
    /// The only legal edges are 0→1, 0→3, 1→2, 1→3, 2→3, 3→4, 4→5.
    /// Anything else is a coordinator bug, not a caller error.
    pub(crate) fn can_advance_to(self, to: State) -> bool {
        use State::*;
        matches!(
            (self, to),
            (Unactivated, Activating)
                | (Unactivated, ShuttingDown)
                | (Activating, Activated)
                | (Activating, ShuttingDown)
                | (Activated, ShuttingDown)
                | (ShuttingDown, LocalShutdown)
                | (LocalShutdown, ShutDown)
        )
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            State::Unactivated => "unactivated",
            State::Activating => "activating",
            State::Activated => "activated",
            State::ShuttingDown => "shutting_down",
            State::LocalShutdown => "local_shutdown",
            State::ShutDown => "shut_down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::State;

    #[test]
    fn ordering_is_monotone() {
        let all = [
            State::Unactivated,
            State::Activating,
            State::Activated,
            State::ShuttingDown,
            State::LocalShutdown,
            State::ShutDown,
        ];
        for pair in all.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn legal_edges_only() {
        use State::*;
        assert!(Unactivated.can_advance_to(Activating));
        assert!(Unactivated.can_advance_to(ShuttingDown));
        assert!(Activating.can_advance_to(Activated));
        assert!(Activating.can_advance_to(ShuttingDown));
        assert!(Activated.can_advance_to(ShuttingDown));
        assert!(ShuttingDown.can_advance_to(LocalShutdown));
        assert!(LocalShutdown.can_advance_to(ShutDown));

        // no skipping forward, no going back, no self-loops
        assert!(!Unactivated.can_advance_to(Activated));
        assert!(!Unactivated.can_advance_to(ShutDown));
        assert!(!Activated.can_advance_to(Activating));
        assert!(!ShuttingDown.can_advance_to(ShutDown));
        assert!(!ShutDown.can_advance_to(ShutDown));
    }
}
