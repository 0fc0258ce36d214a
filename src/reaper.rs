//! Periodic sweep for connections that vanished without a close frame.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::coordinator::Coordinator;

/// Spawn the reaper loop. It runs until the returned handle is aborted.
pub fn spawn(coordinator: Coordinator, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let reaped = coordinator.sweep();
            if reaped > 0 {
                tracing::info!(reaped, "reaper sweep finished");
            } else {
                tracing::debug!("reaper sweep found nothing");
            }
        }
    })
}
