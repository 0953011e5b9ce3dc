// [libs/infra-db/src/lib.rs]
//! SQLite-backed persistence for the sweep: the job store tracks job
//! lifecycle (dispensed/completed/recycled), the result store holds
//! resolved PTR records. The two are separate pools, matching the
//! `JOBS_DB_URL` / `RESULTS_DB_URL` split in the CLI config.

pub mod errors;
pub mod pool;
pub mod repositories;
pub mod schema;

pub use errors::StoreError;
pub use pool::open_pool;
pub use repositories::{JobStore, ResultStore};
