// [libs/infra-resolver/src/driver.rs]
//! Per-worker resolver state: which nameserver is current, its running
//! health stats, and the demotion rule that retires it.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Duration as ChronoDuration;
use rdns_domain_models::stats::NameserverHealth;
use rdns_domain_models::PtrText;
use tracing::{debug, info, warn};

use crate::errors::ResolverError;
use crate::query::{self, WireOutcome};

/// A SERVFAIL or TIMEOUT never counts toward this; only genuine
/// communication failures do, since the former are facts about the
/// remote zone, not about the nameserver we asked.
pub const COMMERR_TRESH: u64 = 10;

pub struct ResolverDriver {
    pool: Vec<String>,
    cur_index: usize,
    health: HashMap<String, NameserverHealth>,
    tcp_only: bool,
}

impl ResolverDriver {
    pub fn new(pool: Vec<String>, tcp_only: bool) -> Result<Self, ResolverError> {
        if pool.is_empty() {
            return Err(ResolverError::NoNameserversLeft);
        }
        let health = pool
            .iter()
            .map(|ns| (ns.clone(), NameserverHealth::default()))
            .collect();
        Ok(Self {
            pool,
            cur_index: 0,
            health,
            tcp_only,
        })
    }

    pub fn current_nameserver(&self) -> &str {
        &self.pool[self.cur_index]
    }

    pub fn health_snapshot(&self) -> &HashMap<String, NameserverHealth> {
        &self.health
    }

    /// Resolves one IPv4 address to its PTR text, updating the current
    /// nameserver's health stats as a side effect. Demotes and switches
    /// nameservers automatically when the comm-error threshold is crossed.
    pub async fn resolve_ip(&mut self, ip: u32) -> Result<PtrText, ResolverError> {
        let nameserver = self.current_nameserver().to_string();
        if !self.health.get(&nameserver).map(|h| h.good).unwrap_or(false) {
            // A prior query already drove this nameserver's errcnt past the
            // threshold and no other good nameserver was left to switch to.
            // That exhaustion is a fact about this query, not the one that
            // tripped it, so it surfaces here rather than retroactively.
            return Err(ResolverError::NoNameserversLeft);
        }

        let name = query::reverse_name(ip)
            .map_err(|err| ResolverError::QueryBuildError(err.to_string()))?;

        let started = Instant::now();
        let outcome = query::query(&name, &nameserver, self.tcp_only).await;
        let elapsed = ChronoDuration::from_std(started.elapsed()).unwrap_or(ChronoDuration::zero());

        let entry = self.health.get_mut(&nameserver).expect("current nameserver tracked");

        let result = match outcome {
            WireOutcome::Answer(text) => {
                debug!(ip, nameserver, "resolved");
                entry.stats.resolvecnt += 1;
                entry.stats.add_duration(elapsed);
                PtrText::Domain(text)
            }
            WireOutcome::NxDomain => {
                entry.stats.resolvecnt += 1;
                entry.stats.nxdcnt += 1;
                entry.stats.add_duration(elapsed);
                PtrText::NxDomain
            }
            WireOutcome::Timeout => {
                warn!(ip, nameserver, "timeout");
                entry.stats.timeoutcnt += 1;
                PtrText::Timeout
            }
            WireOutcome::ServFail => {
                warn!(ip, nameserver, "servfail");
                entry.stats.servfailcnt += 1;
                PtrText::ServFail
            }
            WireOutcome::CommError => {
                warn!(ip, nameserver, "comm error");
                entry.stats.errcnt += 1;
                let errcnt = entry.stats.errcnt;
                if errcnt > COMMERR_TRESH {
                    warn!(nameserver, errcnt, "comm error threshold exceeded, demoting");
                    // The query that tripped the threshold still resolved to
                    // "ERROR" for its own IP. Pool exhaustion from this
                    // demotion is a fact about the *next* query, not this
                    // one, so it is swallowed here rather than propagated.
                    let _ = self.demote_current();
                }
                PtrText::Error
            }
        };

        Ok(result)
    }

    fn demote_current(&mut self) -> Result<(), ResolverError> {
        let current = self.current_nameserver().to_string();
        if let Some(entry) = self.health.get_mut(&current) {
            entry.good = false;
        }
        self.switch_to_next_good()
    }

    fn switch_to_next_good(&mut self) -> Result<(), ResolverError> {
        let next = self
            .pool
            .iter()
            .position(|ns| self.health.get(ns).map(|h| h.good).unwrap_or(false));

        match next {
            Some(index) => {
                self.cur_index = index;
                info!(nameserver = %self.pool[index], "switched nameserver");
                Ok(())
            }
            None => {
                warn!("no more available nameservers");
                Err(ResolverError::NoNameserversLeft)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_first_nameserver_in_pool() {
        let driver = ResolverDriver::new(vec!["8.8.8.8".into(), "8.8.4.4".into()], false).unwrap();
        assert_eq!(driver.current_nameserver(), "8.8.8.8");
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = ResolverDriver::new(vec![], false).unwrap_err();
        assert!(matches!(err, ResolverError::NoNameserversLeft));
    }

    #[test]
    fn demotion_switches_to_next_good_nameserver() {
        let mut driver =
            ResolverDriver::new(vec!["8.8.8.8".into(), "8.8.4.4".into()], false).unwrap();
        driver.demote_current().unwrap();
        assert_eq!(driver.current_nameserver(), "8.8.4.4");
        assert!(!driver.health_snapshot()["8.8.8.8"].good);
    }

    #[test]
    fn demoting_the_last_good_nameserver_errors() {
        let mut driver = ResolverDriver::new(vec!["8.8.8.8".into()], false).unwrap();
        let err = driver.demote_current().unwrap_err();
        assert!(matches!(err, ResolverError::NoNameserversLeft));
    }

    #[tokio::test]
    async fn resolve_after_pool_exhaustion_errors_without_querying() {
        // Exhaust the pool directly, without going through a real query:
        // the query that trips the threshold still resolves to "ERROR"
        // for its own IP (driven in `resolve_ip`'s `CommError` arm); only
        // the *next* call observes the exhaustion.
        let mut driver = ResolverDriver::new(vec!["203.0.113.1".into()], false).unwrap();
        assert!(driver.demote_current().is_err());

        let err = driver.resolve_ip(0x08080808).await.unwrap_err();
        assert!(matches!(err, ResolverError::NoNameserversLeft));
    }
}
