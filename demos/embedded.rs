//! # Example: embedded
//!
//! Embeds a [`Coordinator`] in a connection-like object with dependent
//! children.
//!
//! Demonstrates how to:
//! - Build a coordinator with an explicit shutdown callback.
//! - Activate once through [`Coordinator::activate_with`].
//! - Register a worker's done-signal and a nested coordinator as children.
//! - Drive everything down with a single [`Coordinator::close`].
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► build parent + child coordinators
//!   ├─► activate parent (one-shot hook)
//!   ├─► add_child_done(worker done-signal)
//!   ├─► add_shutdown_child(child coordinator)
//!   └─► close()
//!         ├─► shutdown hook runs, terminal outcome settles
//!         ├─► worker signal + child shutdown awaited concurrently
//!         └─► shutdown-done closes, close() returns
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example embedded
//! ```

use std::sync::Arc;
use std::time::Duration;

use lifevisor::{Coordinator, Outcome, Signal};

struct Conn {
    life: Coordinator,
}

impl Conn {
    fn open() -> Self {
        let life = Coordinator::builder()
            .on_shutdown(|advisory: Outcome| async move {
                println!("[conn] shutdown hook: releasing socket");
                advisory
            })
            .build()
            .expect("shutdown hook provided");
        Self { life }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. Build the embedding object and a nested coordinator
    let conn = Conn::open();
    let child = Coordinator::builder()
        .on_shutdown(|advisory: Outcome| async move {
            println!("[child] shutting down");
            advisory
        })
        .build()
        .expect("shutdown hook provided");

    // 2. One-shot activation
    conn.life
        .activate_with(
            || async {
                println!("[conn] activating");
                Ok(())
            },
            false,
        )
        .await
        .expect("activation succeeds");
    println!("[conn] state={}", conn.life.state().as_label());

    // 3. A background worker, tracked through its done-signal
    let done = Signal::new();
    let worker_done = done.subscribe();
    let started = conn.life.shutdown_started();
    tokio::spawn(async move {
        started.wait().await;
        println!("[worker] draining");
        tokio::time::sleep(Duration::from_millis(100)).await;
        done.close();
    });
    conn.life
        .add_child_done(worker_done.wait_owned())
        .expect("registry open");

    // 4. A nested coordinator, shut down by the parent
    conn.life
        .add_shutdown_child(Arc::new(child.clone()))
        .expect("registry open");

    // 5. One call tears the whole tree down
    conn.life.close().await.expect("clean shutdown");
    println!(
        "[conn] state={} child_done={}",
        conn.life.state().as_label(),
        child.is_done_shutdown()
    );
}
