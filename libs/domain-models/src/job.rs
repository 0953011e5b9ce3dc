// [libs/domain-models/src/job.rs]
//! The unit of work dispatched by the coordinator: a contiguous,
//! half-open IPv4 range `[ipfrom, ipto)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A block of the IPv4 address space, with its lifecycle timestamps.
///
/// `id` is stable for the lifetime of the row; everything else mutates
/// as the job moves through retrieved -> started -> completed (and,
/// when recycling is enabled, back to started again).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub id: i64,
    pub ipfrom: u32,
    pub ipto: u32,
    pub retrieved_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub nameserver: Option<String>,
    pub nxdomain_count: Option<i64>,
    pub error_count: Option<i64>,
}

impl Job {
    /// Constructs a freshly-seeded job with no lifecycle timestamps set.
    pub fn new_block(id: i64, ipfrom: u32, ipto: u32) -> Self {
        debug_assert!(ipfrom < ipto, "job range must be non-empty");
        Self {
            id,
            ipfrom,
            ipto,
            retrieved_at: None,
            started_at: None,
            completed_at: None,
            nameserver: None,
            nxdomain_count: None,
            error_count: None,
        }
    }

    /// Number of IPv4 addresses covered by this job.
    pub fn len(&self) -> u32 {
        self.ipto - self.ipfrom
    }

    pub fn is_empty(&self) -> bool {
        self.ipfrom == self.ipto
    }

    /// Clears `started_at`/`completed_at` so the job can be recycled
    /// back into the dispatch queue.
    pub fn reset_for_recycling(&mut self) {
        self.started_at = None;
        self.completed_at = None;
    }
}
