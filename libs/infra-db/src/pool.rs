// [libs/infra-db/src/pool.rs]
//! Shared connection-opening logic for both stores: parses the
//! `sqlite://` URL, creates the file if missing, and hands back a pool.

use crate::errors::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

pub async fn open_pool(database_url: &str) -> Result<SqlitePool, StoreError> {
    info!(url = database_url, "opening sqlite pool");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|err| StoreError::ConnectionError(err.to_string()))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .map_err(|err| StoreError::ConnectionError(err.to_string()))
}
