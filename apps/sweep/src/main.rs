// [apps/sweep/src/main.rs]
//! Bootstrap: parse CLI directives, open both stores, build the
//! coordinator, spawn workers and the watchdog, wait for shutdown.

mod cli;
mod services;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use cli::Cli;
use rdns_infra_db::{JobStore, ResultStore};
use rdns_infra_resolver::{read_system_resolver, worker_pool, ResolverDriver};
use services::coordinator::{Coordinator, SweepCoordinator};
use services::reaper::spawn_reaper;
use services::worker::Worker;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    rdns_shared_telemetry::init_tracing(cli.debug);

    if let Err(err) = run(cli).await {
        error!(error = %err, "sweep exited with an error");
        return Err(err);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let newdb = cli.newdb;
    let config = cli
        .into_config()
        .context("failed to parse --start-ip/--end-ip")?;

    info!(
        jobsdb = %config.jobsdb_url,
        resultsdb = %config.resultsdb_url,
        workers = config.workers,
        "starting sweep"
    );

    let jobs = JobStore::connect(&config.jobsdb_url)
        .await
        .context("failed to open job store")?;
    if newdb {
        jobs.truncate().await.context("failed to reset job store for --newdb")?;
    }
    let results = ResultStore::connect(&config.resultsdb_url)
        .await
        .context("failed to open result store")?;

    let coordinator: Arc<dyn Coordinator> = Arc::new(
        SweepCoordinator::bootstrap(jobs, results, &config)
            .await
            .context("failed to bootstrap coordinator")?,
    );

    let shutdown = CancellationToken::new();
    let host_default = read_system_resolver();

    let mut worker_handles = Vec::with_capacity(config.workers as usize);
    for id in 0..config.workers {
        let pool = worker_pool(host_default.as_deref());
        let resolver = ResolverDriver::new(pool, config.tcp_only)
            .context("failed to construct resolver driver")?;
        let worker = Worker::new(id, coordinator.clone(), resolver, shutdown.clone());
        worker_handles.push(tokio::spawn(worker.run()));
    }

    let reaper_handle = spawn_reaper(coordinator.clone(), shutdown.clone());

    tokio::signal::ctrl_c()
        .await
        .context("failed to install ctrl-c handler")?;
    info!("shutdown requested");
    shutdown.cancel();

    for handle in worker_handles {
        let _ = handle.await;
    }
    let _ = reaper_handle.await;

    info!("sweep stopped");
    Ok(())
}
