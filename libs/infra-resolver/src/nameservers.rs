// [libs/infra-resolver/src/nameservers.rs]
//! The built-in nameserver pool, shuffled per worker so that a pool of
//! workers doesn't all hammer the same resolver in the same order.

use rand::seq::SliceRandom;
use rand::thread_rng;

/// Open resolvers known to answer PTR queries reliably at the time this
/// list was assembled. Not exhaustive, not curated for uptime guarantees.
pub const DEFAULT_NAMESERVERS: &[&str] = &[
    "8.8.8.8",
    "8.8.4.4",
    "208.67.222.222",
    "208.67.220.220",
    "156.154.70.1",
    "156.154.71.1",
    "8.26.56.26",
    "198.153.192.1",
    "198.153.194.1",
    "4.2.2.1",
    "4.2.2.2",
    "4.2.2.3",
    "4.2.2.4",
    "4.2.2.5",
    "4.2.2.6",
];

/// Builds a per-worker nameserver order: the default pool, shuffled, with
/// the host's own configured resolver appended last as a fallback of
/// last resort.
pub fn worker_pool(host_default: Option<&str>) -> Vec<String> {
    let mut pool: Vec<String> = DEFAULT_NAMESERVERS.iter().map(|s| s.to_string()).collect();
    pool.shuffle(&mut thread_rng());
    if let Some(default) = host_default {
        if !pool.iter().any(|ns| ns == default) {
            pool.push(default.to_string());
        }
    }
    pool
}

/// Reads the first `nameserver` line out of `/etc/resolv.conf`, matching
/// what the original implementation got from
/// `dns.resolver.get_default_resolver().nameservers[0]`. Returns `None`
/// on any non-Unix host or parse failure rather than erroring; the
/// default pool above is the thing that actually has to work.
pub fn read_system_resolver() -> Option<String> {
    let contents = std::fs::read_to_string("/etc/resolv.conf").ok()?;
    contents.lines().find_map(|line| {
        let line = line.trim();
        line.strip_prefix("nameserver")
            .map(|rest| rest.trim().to_string())
            .filter(|addr| !addr.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_host_default_when_absent() {
        let pool = worker_pool(Some("9.9.9.9"));
        assert_eq!(pool.last().map(String::as_str), Some("9.9.9.9"));
        assert_eq!(pool.len(), DEFAULT_NAMESERVERS.len() + 1);
    }

    #[test]
    fn does_not_duplicate_host_default_already_in_pool() {
        let pool = worker_pool(Some("8.8.8.8"));
        assert_eq!(pool.len(), DEFAULT_NAMESERVERS.len());
    }

    #[test]
    fn with_no_host_default_keeps_pool_size() {
        let pool = worker_pool(None);
        assert_eq!(pool.len(), DEFAULT_NAMESERVERS.len());
    }
}
