// [apps/sweep/src/services/worker.rs]
//! Per-job execution loop: fetch a job from the coordinator, resolve
//! every IP in its range, batch results back, report completion.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use rdns_domain_models::stats::JobStats;
use rdns_domain_models::{Job, PtrText};
use rdns_infra_resolver::ResolverDriver;

use crate::services::coordinator::Coordinator;

/// Worker flushes its result batch to the coordinator at this size
/// rather than holding the whole job's results in memory.
pub const SMAX_RESULTBATCH: usize = 1024;

pub struct Worker {
    id: u32,
    coordinator: Arc<dyn Coordinator>,
    resolver: ResolverDriver,
    shutdown: CancellationToken,
}

impl Worker {
    pub fn new(
        id: u32,
        coordinator: Arc<dyn Coordinator>,
        resolver: ResolverDriver,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            id,
            coordinator,
            resolver,
            shutdown,
        }
    }

    /// Runs until the resolver driver's nameserver pool is exhausted or
    /// shutdown is requested. A job in flight when shutdown arrives is
    /// left `DISPENSED` for the watchdog to recover.
    pub async fn run(mut self) {
        info!(worker_id = self.id, "worker started");
        loop {
            let job = tokio::select! {
                job = self.coordinator.retrieve_job() => job,
                _ = self.shutdown.cancelled() => {
                    info!(worker_id = self.id, "worker shutting down");
                    return;
                }
            };

            match self.work_job(job).await {
                Ok(()) => {}
                Err(WorkerFault::ResolverExhausted) => {
                    warn!(worker_id = self.id, "nameserver pool exhausted, worker exiting");
                    return;
                }
            }

            if self.shutdown.is_cancelled() {
                info!(worker_id = self.id, "worker shutting down");
                return;
            }
        }
    }

    #[instrument(skip(self, job), fields(worker_id = self.id, job_id = job.id))]
    async fn work_job(&mut self, mut job: Job) -> Result<(), WorkerFault> {
        // started_at is set by the coordinator at dispense time, not here,
        // so that finish_job persists the same value no matter how long
        // this job actually ran for.
        let mut stats = JobStats::default();
        let mut batch = Vec::with_capacity(SMAX_RESULTBATCH);

        for ip in job.ipfrom..job.ipto {
            if self.shutdown.is_cancelled() {
                break;
            }

            let text = match self.resolver.resolve_ip(ip).await {
                Ok(text) => text,
                Err(_) => {
                    return Err(WorkerFault::ResolverExhausted);
                }
            };
            record_stat(&mut stats, &text);
            batch.push((ip, String::from(text)));

            if batch.len() >= SMAX_RESULTBATCH {
                self.flush(std::mem::take(&mut batch)).await;
            }
        }
        if !batch.is_empty() {
            self.flush(batch).await;
        }

        job.completed_at = Some(Utc::now());
        job.nameserver = Some(self.resolver.current_nameserver().to_string());
        job.nxdomain_count = Some(stats.nxdcnt as i64);
        job.error_count = Some(stats.error_count());

        if let Err(err) = self.coordinator.finish_job(job).await {
            warn!(worker_id = self.id, error = %err, "finish_job failed");
        }
        Ok(())
    }

    async fn flush(&self, batch: Vec<(u32, String)>) {
        let size = batch.len();
        if let Err(err) = self.coordinator.store_results(batch).await {
            warn!(worker_id = self.id, error = %err, size, "store_results failed, batch dropped");
        }
    }
}

/// Job-level classification is a strict subset of resolver outcomes: NX,
/// timeout and comm-error all land in `error_count`/`nxdomain_count` per
/// the store schema; only a successful answer is excluded from either.
fn record_stat(stats: &mut JobStats, text: &PtrText) {
    match text {
        PtrText::Domain(_) => stats.resolvecnt += 1,
        PtrText::NxDomain => {
            stats.resolvecnt += 1;
            stats.nxdcnt += 1;
        }
        PtrText::Timeout => stats.timeoutcnt += 1,
        PtrText::ServFail => stats.servfailcnt += 1,
        PtrText::Error => stats.errcnt += 1,
    }
}

#[derive(Debug)]
enum WorkerFault {
    ResolverExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use rdns_infra_db::StoreError;
    use rdns_infra_resolver::ResolverDriver;

    struct FakeCoordinator {
        batches: StdMutex<Vec<Vec<(u32, String)>>>,
    }

    impl FakeCoordinator {
        fn new() -> Self {
            Self {
                batches: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Coordinator for FakeCoordinator {
        async fn retrieve_job(&self) -> Job {
            unreachable!("work_job is driven directly in this test, not through retrieve_job")
        }

        async fn store_results(&self, batch: Vec<(u32, String)>) -> Result<(), StoreError> {
            self.batches.lock().unwrap().push(batch);
            Ok(())
        }

        async fn finish_job(&self, _job: Job) -> Result<(), StoreError> {
            Ok(())
        }

        async fn watchdog(&self) -> crate::services::coordinator::WatchdogReport {
            crate::services::coordinator::WatchdogReport::default()
        }
    }

    #[tokio::test]
    async fn a_2048_ip_job_flushes_exactly_two_full_batches() {
        // Every nameserver string below fails to parse as a socket address
        // once the fixed DNS port is appended, so each query is classified
        // CommError without ever touching the network. COMMERR_TRESH lets
        // each nameserver absorb 11 calls before demotion; 200 of them give
        // 2200 calls of headroom, comfortably covering all 2048 IPs in this
        // job without exhausting the pool.
        let pool: Vec<String> = (0..200).map(|i| format!("not-a-nameserver-{i}")).collect();
        let resolver = ResolverDriver::new(pool, false).unwrap();
        let coordinator = Arc::new(FakeCoordinator::new());
        let mut worker = Worker::new(1, coordinator.clone(), resolver, CancellationToken::new());

        let job = Job::new_block(1, 0, 2048);
        worker.work_job(job).await.unwrap();

        let batches = coordinator.batches.lock().unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), SMAX_RESULTBATCH);
        assert_eq!(batches[1].len(), SMAX_RESULTBATCH);
    }
}
