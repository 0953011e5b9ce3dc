// [libs/domain-models/src/stats.rs]
//! Counters tracked per job and per (worker x nameserver). Both share
//! the same shape; job stats reset at the start of every job, while
//! nameserver health persists for the lifetime of the worker.

use chrono::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStats {
    pub resolvecnt: u64,
    pub nxdcnt: u64,
    pub timeoutcnt: u64,
    pub errcnt: u64,
    pub servfailcnt: u64,
    pub tot_duration_millis: i64,
}

impl Default for JobStats {
    fn default() -> Self {
        Self {
            resolvecnt: 0,
            nxdcnt: 0,
            timeoutcnt: 0,
            errcnt: 0,
            servfailcnt: 0,
            tot_duration_millis: 0,
        }
    }
}

impl JobStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add_duration(&mut self, duration: Duration) {
        self.tot_duration_millis += duration.num_milliseconds();
    }

    /// `error_count` as reported to the job store: comm errors, timeouts
    /// and SERVFAILs all count against a job's health.
    pub fn error_count(&self) -> i64 {
        (self.errcnt + self.timeoutcnt + self.servfailcnt) as i64
    }
}

/// Per-nameserver health, keyed externally by nameserver address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameserverHealth {
    pub good: bool,
    pub stats: JobStats,
}

impl Default for NameserverHealth {
    fn default() -> Self {
        Self {
            good: true,
            stats: JobStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_count_sums_transient_failure_classes() {
        let mut stats = JobStats::default();
        stats.errcnt = 11;
        stats.timeoutcnt = 2;
        stats.servfailcnt = 8;
        stats.nxdcnt = 4;
        assert_eq!(stats.error_count(), 21);
    }

    #[test]
    fn reset_clears_all_counters() {
        let mut stats = JobStats::default();
        stats.resolvecnt = 5;
        stats.nxdcnt = 1;
        stats.reset();
        assert_eq!(stats.resolvecnt, 0);
        assert_eq!(stats.nxdcnt, 0);
    }
}
