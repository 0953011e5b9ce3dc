// [apps/sweep/src/state/mission_control.rs]
//! In-memory job queue. Workers pull from here, never from the database
//! directly; the coordinator's refill task is the only writer that talks
//! to the job store, keeping at-most-one-worker-per-job a property of
//! this queue rather than something every caller has to get right.

use std::collections::VecDeque;
use tokio::sync::{Mutex, Notify};

use rdns_domain_models::Job;

pub struct MissionControl {
    queue: Mutex<VecDeque<Job>>,
    notify: Notify,
}

impl MissionControl {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        }
    }

    /// Blocks until a job is available. A `Notified` future is created
    /// before the queue is checked so a push landing between the check
    /// and the await is never missed.
    pub async fn pull(&self) -> Job {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);

            {
                let mut queue = self.queue.lock().await;
                if let Some(job) = queue.pop_front() {
                    return job;
                }
            }

            notified.await;
        }
    }

    pub async fn push_batch(&self, jobs: Vec<Job>) {
        if jobs.is_empty() {
            return;
        }
        let mut queue = self.queue.lock().await;
        queue.extend(jobs);
        drop(queue);
        self.notify.notify_waiters();
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}

impl Default for MissionControl {
    fn default() -> Self {
        Self::new()
    }
}
