// [libs/infra-resolver/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("no more available nameservers")]
    NoNameserversLeft,

    #[error("failed to build query message: {0}")]
    QueryBuildError(String),
}
