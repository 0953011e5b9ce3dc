// [libs/infra-db/src/repositories/result_store.rs]
//! PTR result persistence. Writers call [`ResultStore::upsert_batch`] once
//! per worker batch; a repeat PTR lookup for an IP overwrites the prior
//! value rather than erroring, since the latest resolution wins.

use crate::errors::StoreError;
use crate::pool::open_pool;
use crate::repositories::result_queries as q;
use crate::schema::apply_results_schema;
use rdns_domain_models::PtrRecord;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub struct ResultStore {
    pool: SqlitePool,
}

impl ResultStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = open_pool(database_url).await?;
        apply_results_schema(&pool).await?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Writes an entire worker batch in one transaction. An empty batch is
    /// a no-op rather than an error, matching the at-least-once delivery
    /// workers use when retrying a batch after a partial failure.
    #[instrument(skip(self, records))]
    pub async fn upsert_batch(&self, records: &[PtrRecord]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StoreError::TransactionError(err.to_string()))?;

        for record in records {
            sqlx::query(q::UPSERT_PTR)
                .bind(record.ip)
                .bind(&record.ptr)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|err| StoreError::TransactionError(err.to_string()))?;
        Ok(records.len() as u64)
    }

    pub async fn get(&self, ip: u32) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(q::SELECT_PTR)
            .bind(ip)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("ptr")))
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query(q::COUNT_PTR).fetch_one(&self.pool).await?;
        Ok(row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upserts_overwrite_prior_resolution() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        apply_results_schema(&pool).await.unwrap();
        let store = ResultStore::from_pool(pool);

        store
            .upsert_batch(&[PtrRecord::new(167772160, "old.example.com".to_string())])
            .await
            .unwrap();
        store
            .upsert_batch(&[PtrRecord::new(167772160, "new.example.com".to_string())])
            .await
            .unwrap();

        assert_eq!(store.get(167772160).await.unwrap().unwrap(), "new.example.com");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        apply_results_schema(&pool).await.unwrap();
        let store = ResultStore::from_pool(pool);

        let written = store.upsert_batch(&[]).await.unwrap();
        assert_eq!(written, 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_ip_returns_none() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        apply_results_schema(&pool).await.unwrap();
        let store = ResultStore::from_pool(pool);
        assert!(store.get(1).await.unwrap().is_none());
    }
}
