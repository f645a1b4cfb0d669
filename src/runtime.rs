//! Async driver for an [`Engine`].
//!
//! Events are applied strictly in arrival order on one task. Between events
//! the loop sleeps until the next queue deadline, so both coalescing queues
//! drain on quiescence. Closing the event channel flushes everything and
//! returns.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

use crate::engine::Engine;
use crate::host::{TabEvent, TabHost};
use crate::store::Store;

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Runs until `events` is closed. Failures are logged and never stop the loop.
pub async fn run<S: Store, H: TabHost>(engine: &mut Engine<S, H>, mut events: mpsc::Receiver<TabEvent>) {
    loop {
        let deadline = engine.next_deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if let Err(e) = engine.handle_event(event, Instant::now()) {
                        warn!(error = %e, "failed to apply tab event");
                    }
                }
                None => {
                    if let Err(e) = engine.flush_all(Instant::now()) {
                        warn!(error = %e, "final flush failed");
                    }
                    info!("event stream closed");
                    return;
                }
            },
            _ = wait_for(deadline) => {
                if let Err(e) = engine.flush_due(Instant::now()) {
                    warn!(error = %e, "failed to flush queues");
                }
            }
        }
    }
}
