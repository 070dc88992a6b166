//! # Example: cancel
//!
//! Bounds a coordinator's lifetime to an external cancellation source.
//!
//! Shows how to:
//! - Bind a [`CancellationToken`] with [`Coordinator::shutdown_on_cancel`].
//! - Observe the shutdown-started signal from the outside.
//! - Read the terminal outcome produced by the cancellation cause.
//!
//! ## Run
//! ```bash
//! cargo run --example cancel
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lifevisor::{fault, Coordinator, Outcome};

#[derive(Debug, thiserror::Error)]
#[error("operator requested stop")]
struct Stop;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let coord = Coordinator::builder()
        .on_shutdown(|advisory: Outcome| async move {
            println!("[coord] shutting down: {advisory:?}");
            advisory
        })
        .build()
        .expect("shutdown hook provided");

    // 1. Bind the lifetime to a token
    let token = CancellationToken::new();
    coord.shutdown_on_cancel(token.clone(), fault(Stop));

    // 2. Somebody cancels it a little later
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        println!("[operator] cancelling");
        trigger.cancel();
    });

    // 3. Wait for the natural end of life
    let outcome = coord.wait_shutdown().await;
    println!(
        "[coord] state={} outcome={outcome:?}",
        coord.state().as_label()
    );
}
