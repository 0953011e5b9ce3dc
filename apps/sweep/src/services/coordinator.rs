// [apps/sweep/src/services/coordinator.rs]
//! The C2: owns both stores and the in-memory dispatch queue, dispenses
//! jobs to workers, and refills the queue when it drains. The only
//! concrete implementation of [`Coordinator`] — a remote variant would
//! implement the same trait against a network transport instead.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, instrument, warn};

use rdns_core_ipgen::Ipv4BlockGenerator;
use rdns_domain_models::{Job, PtrRecord, SweepConfig};
use rdns_infra_db::{JobStore, ResultStore, StoreError};

use crate::state::mission_control::MissionControl;

const REFILL_BATCH: i64 = 1024;

#[async_trait]
pub trait Coordinator: Send + Sync {
    async fn retrieve_job(&self) -> Job;
    async fn store_results(&self, batch: Vec<(u32, String)>) -> Result<(), StoreError>;
    async fn finish_job(&self, job: Job) -> Result<(), StoreError>;
    async fn watchdog(&self) -> WatchdogReport;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WatchdogReport {
    pub recovered: u64,
}

pub struct SweepCoordinator {
    jobs: JobStore,
    results: ResultStore,
    queue: MissionControl,
    refill_lock: AsyncMutex<()>,
    recycle_completed: bool,
    /// Set once initial seeding/refill has observed a genuinely dry job
    /// store with recycling disabled, so `retrieve_job` doesn't spin
    /// retrying refills that can never find work again.
    exhausted: AtomicBool,
}

impl SweepCoordinator {
    #[instrument(skip(jobs, results, config))]
    pub async fn bootstrap(
        jobs: JobStore,
        results: ResultStore,
        config: &SweepConfig,
    ) -> Result<Self, StoreError> {
        let (open, total) = jobs.count_open_and_total().await?;
        if open == 0 && total == 0 {
            info!("job store empty, seeding from block generator");
            let generator =
                Ipv4BlockGenerator::new(config.start_ip, config.end_ip, config.block_size);
            let seeded = jobs.seed_jobs(generator).await?;
            info!(seeded, "seeding complete");
        }

        let coordinator = Self {
            jobs,
            results,
            queue: MissionControl::new(),
            refill_lock: AsyncMutex::new(()),
            recycle_completed: config.recycle_completed,
            exhausted: AtomicBool::new(false),
        };
        coordinator.refill().await?;
        Ok(coordinator)
    }

    /// Single-writer-guarded refill: drains up to [`REFILL_BATCH`] open
    /// jobs, then (if recycling is enabled and the batch was short) tops
    /// up with completed jobs reset back to NEW.
    #[instrument(skip(self))]
    async fn refill(&self) -> Result<u64, StoreError> {
        let _guard = self.refill_lock.lock().await;

        let open = self.jobs.fetch_open(REFILL_BATCH).await?;
        let mut filled = open.len() as i64;
        let mut batch = open;

        if filled < REFILL_BATCH && self.recycle_completed {
            let remaining = REFILL_BATCH - filled;
            let mut completed = self.jobs.fetch_completed(remaining).await?;
            for job in completed.iter_mut() {
                self.jobs.clear_for_recycle(job.id).await?;
                job.reset_for_recycling();
            }
            filled += completed.len() as i64;
            batch.extend(completed);
        }

        if batch.is_empty() {
            if !self.recycle_completed {
                warn!("job store exhausted and recycling disabled, sweep will idle until shutdown");
                self.exhausted.store(true, Ordering::SeqCst);
            }
            return Ok(0);
        }

        let count = batch.len() as u64;
        self.queue.push_batch(batch).await;
        info!(count, "refilled dispatch queue");
        Ok(count)
    }
}

#[async_trait]
impl Coordinator for SweepCoordinator {
    #[instrument(skip(self))]
    async fn retrieve_job(&self) -> Job {
        loop {
            let mut job = self.queue.pull().await;
            let now = Utc::now();
            job.retrieved_at = Some(now);
            job.started_at = Some(now);
            if let Err(err) = self.jobs.mark_retrieved(job.id, now).await {
                warn!(job_id = job.id, error = %err, "failed to persist retrieved_at, dispensing anyway");
            }
            // Written now, not when the worker later calls `finish_job`:
            // `fetch_open` excludes anything with `started_at` set, so a
            // refill racing this in-flight job must see it immediately,
            // not only once the job completes.
            if let Err(err) = self.jobs.mark_started(job.id, now).await {
                warn!(job_id = job.id, error = %err, "failed to persist started_at, dispensing anyway");
            }

            if self.queue.is_empty().await {
                if let Err(err) = self.refill().await {
                    warn!(error = %err, "refill after dispense failed");
                }
            }

            return job;
        }
    }

    #[instrument(skip(self, batch))]
    async fn store_results(&self, batch: Vec<(u32, String)>) -> Result<(), StoreError> {
        let records: Vec<PtrRecord> = batch
            .into_iter()
            .map(|(ip, ptr)| PtrRecord::new(ip, ptr))
            .collect();
        self.results.upsert_batch(&records).await?;
        Ok(())
    }

    #[instrument(skip(self, job))]
    async fn finish_job(&self, job: Job) -> Result<(), StoreError> {
        self.jobs.finish_job(&job).await?;
        if self.queue.is_empty().await {
            self.refill().await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn watchdog(&self) -> WatchdogReport {
        let stale = match self
            .jobs
            .find_stale_dispensed(chrono::Duration::minutes(10), REFILL_BATCH)
            .await
        {
            Ok(stale) => stale,
            Err(err) => {
                warn!(error = %err, "watchdog scan failed");
                return WatchdogReport::default();
            }
        };

        let mut recovered = 0u64;
        for job in &stale {
            if self.jobs.recover_stale(job.id).await.is_ok() {
                recovered += 1;
            }
        }
        if recovered > 0 {
            if let Err(err) = self.refill().await {
                warn!(error = %err, "refill after watchdog recovery failed");
            }
        }
        WatchdogReport { recovered }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdns_infra_db::{JobStore, ResultStore};

    async fn seeded_coordinator(open: i64, completed: i64) -> SweepCoordinator {
        let jobs_dir = tempfile::tempdir().unwrap();
        let jobs_url = format!("sqlite://{}/jobs.db", jobs_dir.path().display());
        let jobs = JobStore::connect(&jobs_url).await.unwrap();

        let results_dir = tempfile::tempdir().unwrap();
        let results_url = format!("sqlite://{}/results.db", results_dir.path().display());
        let results = ResultStore::connect(&results_url).await.unwrap();

        let total = open + completed;
        jobs.seed_jobs((0..total).map(|i| (i as u32 * 256, i as u32 * 256 + 255)))
            .await
            .unwrap();

        let mut to_complete = jobs.fetch_open(completed).await.unwrap();
        for job in to_complete.iter_mut() {
            job.started_at = Some(Utc::now());
            job.completed_at = Some(Utc::now());
            job.nameserver = Some("8.8.8.8".to_string());
            job.nxdomain_count = Some(0);
            job.error_count = Some(0);
            jobs.finish_job(job).await.unwrap();
        }

        SweepCoordinator {
            jobs,
            results,
            queue: MissionControl::new(),
            refill_lock: AsyncMutex::new(()),
            recycle_completed: true,
            exhausted: AtomicBool::new(false),
        }
    }

    #[tokio::test]
    async fn refill_tops_up_open_jobs_with_recycled_completed_ones() {
        // 500 NEW + 2000 COMPLETED: the first refill pulls all 500 open
        // jobs, then recycles 524 completed ones to round out REFILL_BATCH.
        let coordinator = seeded_coordinator(500, 2000).await;

        let filled = coordinator.refill().await.unwrap();
        assert_eq!(filled, REFILL_BATCH as u64);
        assert_eq!(coordinator.queue.len().await, REFILL_BATCH as usize);
    }

    #[tokio::test]
    async fn refill_with_recycling_disabled_marks_the_coordinator_exhausted() {
        let mut coordinator = seeded_coordinator(0, 10).await;
        coordinator.recycle_completed = false;

        let filled = coordinator.refill().await.unwrap();
        assert_eq!(filled, 0);
        assert!(coordinator.exhausted.load(Ordering::SeqCst));
    }
}
