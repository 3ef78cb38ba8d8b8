//! # Idempotency Sweeper
//!
//! Background task that purges expired idempotency keys on a fixed interval.
//!
//! Lookups already ignore expired keys; the sweep only bounds memory.
//!
//! ```rust,ignore
//! let sweeper = spawn_idempotency_sweeper(store, Duration::from_secs(30));
//! // ... serve ...
//! sweeper.shutdown().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use medpos_core::idempotency::IdempotencyStore;

/// Handle for stopping the sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task to stop and waits for it.
    pub async fn shutdown(self) {
        // The task may already be gone; either way it is stopping.
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Idempotency sweeper task ended abnormally");
        }
    }
}

/// Spawns the sweeper on the current tokio runtime.
pub fn spawn_idempotency_sweeper(store: Arc<dyn IdempotencyStore>, every: Duration) -> SweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    let task = tokio::spawn(async move {
        info!(interval_secs = every.as_secs(), "Idempotency sweeper starting");

        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let purged = store.purge_expired();
                    if purged > 0 {
                        debug!(purged, remaining = store.len(), "Purged expired idempotency keys");
                    }
                }

                _ = shutdown_rx.recv() => {
                    info!("Idempotency sweeper shutting down");
                    break;
                }
            }
        }

        info!("Idempotency sweeper stopped");
    });

    SweeperHandle { shutdown_tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medpos_core::idempotency::InMemoryIdempotencyStore;

    #[tokio::test]
    async fn test_sweeper_purges_and_stops() {
        let store = Arc::new(InMemoryIdempotencyStore::new(Duration::from_millis(10)));
        store.mark_in_flight("a");
        store.mark_in_flight("b");

        let handle = spawn_idempotency_sweeper(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.len(), 0);

        handle.shutdown().await;
    }
}
