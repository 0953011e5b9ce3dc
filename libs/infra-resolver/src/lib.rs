// [libs/infra-resolver/src/lib.rs]
//! Driver for resolving PTR records over a rotating nameserver pool.
//! Built directly on DNS wire messages rather than a convenience client
//! so that SERVFAIL and genuine comm failures stay distinguishable.

pub mod driver;
pub mod errors;
pub mod nameservers;
pub mod query;

pub use driver::{ResolverDriver, COMMERR_TRESH};
pub use errors::ResolverError;
pub use nameservers::{read_system_resolver, worker_pool, DEFAULT_NAMESERVERS};
