// [libs/infra-db/src/errors.rs]
//! Error catalog for both stores. Kept narrow: callers above this
//! crate only ever need to know whether a write landed or not.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open database connection: {0}")]
    ConnectionError(String),

    #[error("query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("transaction failed: {0}")]
    TransactionError(String),

    #[error("job {0} not found")]
    JobNotFound(i64),
}
