// [apps/sweep/src/cli.rs]
//! Command-line directives for the sweep binary, matching the `--flag`
//! / `env = "..."` convention the rest of this workspace's CLIs use.

use clap::Parser;
use rdns_domain_models::SweepConfig;

#[derive(Parser, Debug)]
#[command(
    name = "sweep",
    version,
    about = "Exhaustive reverse-DNS sweep of the IPv4 address space"
)]
pub struct Cli {
    /// Verbose logging (overrides RUST_LOG if unset).
    #[arg(long)]
    pub debug: bool,

    /// Job store connection URL.
    #[arg(long, env = "JOBS_DB_URL", default_value = "sqlite:///jobs.db")]
    pub jobsdb: String,

    /// Result store connection URL.
    #[arg(long, env = "RESULTS_DB_URL", default_value = "sqlite:///results.db")]
    pub resultsdb: String,

    /// Treat the job store as empty even if it already has rows.
    #[arg(long)]
    pub newdb: bool,

    /// Number of concurrent worker tasks.
    #[arg(long, env = "SWEEP_WORKERS", default_value_t = 5)]
    pub workers: u32,

    /// Start of the scanned IPv4 range (inclusive).
    #[arg(long)]
    pub start_ip: Option<String>,

    /// End of the scanned IPv4 range (exclusive).
    #[arg(long)]
    pub end_ip: Option<String>,

    /// Job block width, in addresses.
    #[arg(long)]
    pub block_size: Option<u32>,

    /// Force TCP transport for every query.
    #[arg(long)]
    pub tcp_only: bool,

    /// Disable recycling of completed jobs; the sweep runs to completion
    /// instead of running forever.
    #[arg(long)]
    pub no_recycle: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<SweepConfig, std::net::AddrParseError> {
        let defaults = SweepConfig::default();

        let start_ip = self
            .start_ip
            .as_deref()
            .map(rdns_core_ipgen::ip_to_u32)
            .transpose()?
            .unwrap_or(defaults.start_ip);
        let end_ip = self
            .end_ip
            .as_deref()
            .map(rdns_core_ipgen::ip_to_u32)
            .transpose()?
            .unwrap_or(defaults.end_ip);

        Ok(SweepConfig {
            start_ip,
            end_ip,
            block_size: self.block_size.unwrap_or(defaults.block_size),
            jobsdb_url: self.jobsdb,
            resultsdb_url: self.resultsdb,
            workers: self.workers,
            tcp_only: self.tcp_only,
            recycle_completed: !self.no_recycle,
        })
    }
}
