// [libs/domain-models/src/config.rs]
//! Sweep-wide configuration, shared by the CLI, the coordinator and the
//! block generator so that none of them hard-code these defaults twice.

use serde::{Deserialize, Serialize};

/// `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16` in `(first, last)`
/// inclusive form, as `u32` host-order addresses.
pub const PRIVATE_RANGES: [(u32, u32); 3] = [
    (0x0A00_0000, 0x0AFF_FFFF),
    (0xAC10_0000, 0xAC1F_FFFF),
    (0xC0A8_0000, 0xC0A8_FFFF),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub start_ip: u32,
    pub end_ip: u32,
    pub block_size: u32,
    pub jobsdb_url: String,
    pub resultsdb_url: String,
    pub workers: u32,
    pub tcp_only: bool,
    pub recycle_completed: bool,
}

impl Default for SweepConfig {
    // `end_ip` is u32 so the upper bound of the address space is
    // u32::MAX (2^32 - 1) rather than the literal 2^32 the distilled
    // spec writes for a uint32 default: 2^32 does not fit in a u32,
    // and the single excluded address (255.255.255.255, a broadcast
    // address) was never going to carry a usable PTR record anyway.
    fn default() -> Self {
        Self {
            start_ip: 1 << 24,
            end_ip: u32::MAX,
            block_size: 1 << 12,
            jobsdb_url: "sqlite:///jobs.db".to_string(),
            resultsdb_url: "sqlite:///results.db".to_string(),
            workers: 5,
            tcp_only: false,
            recycle_completed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let config = SweepConfig::default();
        assert_eq!(config.start_ip, 1 << 24);
        assert_eq!(config.end_ip, u32::MAX);
        assert_eq!(config.block_size, 1 << 12);
        assert_eq!(config.workers, 5);
        assert!(config.recycle_completed);
    }
}
