// [libs/shared-telemetry/src/lib.rs]
//! Process-wide `tracing` setup: one subscriber, configured once from
//! `--debug` and `RUST_LOG`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global subscriber. `debug` raises the default level
/// for this crate's own targets to `debug`; `RUST_LOG`, if set, always
/// wins.
///
/// # Panics
/// Panics if a global subscriber has already been installed.
pub fn init_tracing(debug: bool) {
    let default_directive = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rdns={default_directive},sqlx=warn")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
