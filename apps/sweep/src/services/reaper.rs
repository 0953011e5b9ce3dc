// [apps/sweep/src/services/reaper.rs]
//! Periodic background task that re-queues jobs abandoned by a worker
//! that died mid-job: dispensed but never completed, past the lease
//! threshold the coordinator's watchdog enforces.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::services::coordinator::Coordinator;

const REAPER_INTERVAL: Duration = Duration::from_secs(60);

pub fn spawn_reaper(
    coordinator: Arc<dyn Coordinator>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REAPER_INTERVAL);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = coordinator.watchdog().await;
                    if report.recovered > 0 {
                        info!(recovered = report.recovered, "watchdog recovered stale jobs");
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("reaper shutting down");
                    break;
                }
            }
        }
    })
}
