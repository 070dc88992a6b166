//! End-to-end lifecycle scenarios: activation, scheduling, deferral, and the
//! synchronous shutdown wrappers.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lifevisor::{Coordinator, LifecycleError, OnceActivate, OnceShutdown, Outcome, State};

use common::{boom, msg, pass_through, settles_on};

#[tokio::test(flavor = "multi_thread")]
async fn happy_path() {
    let (coord, runs) = pass_through();

    let activated = coord
        .activate_with(|| async { Ok(()) }, false)
        .await;
    assert!(activated.is_ok());
    assert!(coord.is_activated());
    assert_eq!(coord.state(), State::Activated);

    assert!(coord.close().await.is_ok());
    assert_eq!(coord.state(), State::ShutDown);
    assert!(coord.is_done_shutdown());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn activation_failure_drives_full_shutdown() {
    let (coord, runs) = pass_through();

    let result = coord
        .activate_with(|| async { Err(boom("activation exploded")) }, true)
        .await;
    assert_eq!(msg(&result), "activation exploded");

    // never passed through Activated
    assert!(!coord.is_activated());
    assert_eq!(coord.state(), State::ShutDown);
    assert_eq!(msg(&coord.wait_shutdown().await), "activation exploded");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn deferred_shutdown_waits_for_gate() {
    let (coord, runs) = pass_through();

    coord.defer_shutdown().expect("gate open");
    assert!(coord.start_shutdown(Err(boom("e1"))));

    // scheduled, but the gate holds the start back
    assert!(coord.is_scheduled_shutdown());
    assert!(!coord.is_started_shutdown());
    assert!(coord.state() < State::ShuttingDown);
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    coord.undefer_shutdown();
    assert!(coord.is_started_shutdown());
    assert_eq!(msg(&coord.wait_shutdown().await), "e1");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn first_scheduler_wins() {
    let (coord, _runs) = pass_through();

    assert!(coord.start_shutdown(Err(boom("first"))));
    assert!(!coord.start_shutdown(Err(boom("second"))));

    assert_eq!(msg(&coord.wait_shutdown().await), "first");
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_hook_return_value_wins() {
    let (coord, runs) = settles_on(boom("hook knows best"));

    let result = coord.shutdown(Err(boom("advisory"))).await;
    assert_eq!(msg(&result), "hook knows best");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn close_is_idempotent_with_shared_outcome() {
    let (coord, runs) = settles_on(boom("terminal"));

    for _ in 0..3 {
        assert_eq!(msg(&coord.close().await), "terminal");
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn blocked_activation_reports_cannot_activate() {
    let (coord, _runs) = pass_through();

    coord.start_shutdown(Err(boom("prior failure")));

    let hook_ran = Arc::new(AtomicUsize::new(0));
    let counted = hook_ran.clone();
    let result = coord
        .activate_with(
            move || async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            true,
        )
        .await;

    // the diagnostic is that activation was impossible; the terminal error
    // of the shutdown is not substituted
    assert_eq!(
        msg(&result),
        LifecycleError::ShutdownBeforeActivation.to_string()
    );
    assert_eq!(hook_ran.load(Ordering::SeqCst), 0);
    assert!(coord.is_done_shutdown());
}

#[tokio::test(flavor = "multi_thread")]
async fn defer_after_shutdown_started_is_rejected() {
    let (coord, _runs) = pass_through();

    coord.start_shutdown(Ok(()));
    assert_eq!(
        coord.defer_shutdown(),
        Err(LifecycleError::ShutdownStarted)
    );
    assert!(coord.close().await.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_handler_replaceable_until_activation() {
    let (coord, old_hook_runs) = pass_through();

    coord
        .set_shutdown_handler(|_advisory| async { Err(boom("replacement")) })
        .expect("not yet activated");

    coord
        .activate_with(|| async { Ok(()) }, false)
        .await
        .expect("activation succeeds");
    assert_eq!(
        coord.set_shutdown_handler(|advisory| async { advisory }),
        Err(LifecycleError::HandlerFrozen)
    );

    assert_eq!(msg(&coord.close().await), "replacement");
    assert_eq!(old_hook_runs.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn log_frozen_once_activation_begins() {
    let (coord, _runs) = pass_through();
    assert!(coord.set_log(lifevisor::NopLog).is_ok());

    coord
        .activate_with(|| async { Ok(()) }, false)
        .await
        .expect("activation succeeds");
    assert_eq!(
        coord.set_log(lifevisor::NopLog),
        Err(LifecycleError::LogFrozen)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn builder_rejects_missing_shutdown_capability() {
    assert_eq!(
        Coordinator::builder().build().err(),
        Some(LifecycleError::NoShutdownHandler)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn construct_time_activation() {
    let (coord, _runs) = pass_through();

    coord.set_activated().expect("shutdown not started");
    assert!(coord.is_activated());
    assert_eq!(coord.state(), State::Activated);

    // activation is an early-out now, no hook involved
    assert!(coord.activate_with(|| async { Ok(()) }, false).await.is_ok());
    assert!(coord.close().await.is_ok());

    // sticky through and past shutdown
    assert!(coord.is_activated());
}

#[tokio::test(flavor = "multi_thread")]
async fn set_activated_loses_to_shutdown() {
    let (coord, _runs) = pass_through();

    coord.start_shutdown(Ok(()));
    assert_eq!(
        coord.set_activated(),
        Err(LifecycleError::ShutdownBeforeActivation)
    );
    assert!(!coord.is_activated());
    assert!(coord.close().await.is_ok());
    assert!(!coord.is_activated());
}

#[tokio::test(flavor = "multi_thread")]
async fn local_shutdown_settles_terminal_before_dependents() {
    let (coord, _runs) = pass_through();

    let result = coord.local_shutdown(Err(boom("local"))).await;
    assert_eq!(msg(&result), "local");
    assert!(coord.is_done_local_shutdown());

    assert_eq!(msg(&coord.wait_shutdown().await), "local");
    assert!(coord.is_done_shutdown());
}

#[tokio::test(flavor = "multi_thread")]
async fn undefer_wrappers_release_and_wait() {
    let (coord, _runs) = pass_through();

    coord.defer_shutdown().expect("gate open");
    let result = coord.undefer_and_shutdown(Err(boom("done"))).await;
    assert_eq!(msg(&result), "done");
    assert!(coord.is_done_shutdown());
}

#[tokio::test(flavor = "multi_thread")]
async fn undefer_if_not_activated_spares_the_activated() {
    let (coord, runs) = pass_through();
    coord
        .activate_with(|| async { Ok(()) }, false)
        .await
        .expect("activation succeeds");

    coord.defer_shutdown().expect("gate open");
    let result = coord
        .undefer_and_shutdown_if_not_activated(Err(boom("cleanup")), true)
        .await;
    assert!(result.is_ok());
    assert!(!coord.is_scheduled_shutdown());
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    assert!(coord.close().await.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn undefer_if_not_activated_shuts_down_the_unactivated() {
    let (coord, _runs) = pass_through();

    coord.defer_shutdown().expect("gate open");
    let result = coord
        .undefer_and_local_shutdown_if_not_activated(Err(boom("never activated")), true)
        .await;
    assert_eq!(msg(&result), "never activated");
    assert!(coord.is_done_local_shutdown());
    assert!(!coord.is_activated());
}

struct Managed {
    activations: AtomicUsize,
    shutdowns: AtomicUsize,
}

#[async_trait::async_trait]
impl OnceActivate for Managed {
    async fn handle_once_activate(&self) -> Outcome {
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait::async_trait]
impl OnceShutdown for Managed {
    async fn handle_once_shutdown(&self, advisory: Outcome) -> Outcome {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        advisory
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn capability_based_hooks() {
    let obj = Arc::new(Managed {
        activations: AtomicUsize::new(0),
        shutdowns: AtomicUsize::new(0),
    });

    let coord = Coordinator::builder()
        .activator(obj.clone())
        .shutdowner(obj.clone())
        .build()
        .expect("capabilities provided");

    assert!(coord.activate(false).await.is_ok());
    assert!(coord.is_activated());
    assert!(coord.close().await.is_ok());

    assert_eq!(obj.activations.load(Ordering::SeqCst), 1);
    assert_eq!(obj.shutdowns.load(Ordering::SeqCst), 1);
}
