// [libs/infra-db/src/repositories/job_store.rs]
//! Job lifecycle persistence: seeding, open/completed fetches, and the
//! retrieved/started/completed timestamp transitions a job walks through.

use crate::errors::StoreError;
use crate::pool::open_pool;
use crate::repositories::job_queries as q;
use crate::schema::apply_jobs_schema;
use chrono::{DateTime, Duration, Utc};
use rdns_domain_models::Job;
use sqlx::{Row, SqlitePool};
use tracing::{info, instrument, warn};

/// Jobs are seeded in batches this large, committing between batches so a
/// crash mid-seed loses at most one batch rather than the whole run.
pub const JOB_SEED_COMMIT_SIZE: usize = 1000;

pub struct JobStore {
    pool: SqlitePool,
}

impl JobStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = open_pool(database_url).await?;
        apply_jobs_schema(&pool).await?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts `blocks` as NEW jobs, committing every [`JOB_SEED_COMMIT_SIZE`]
    /// rows. A failure partway through rolls back only the in-flight batch.
    #[instrument(skip(self, blocks))]
    pub async fn seed_jobs(
        &self,
        blocks: impl Iterator<Item = (u32, u32)>,
    ) -> Result<u64, StoreError> {
        let mut seeded: u64 = 0;
        let mut batch = Vec::with_capacity(JOB_SEED_COMMIT_SIZE);

        for block in blocks {
            batch.push(block);
            if batch.len() >= JOB_SEED_COMMIT_SIZE {
                seeded += self.commit_batch(&batch).await?;
                batch.clear();
            }
        }
        if !batch.is_empty() {
            seeded += self.commit_batch(&batch).await?;
        }

        info!(seeded, "seeded jobs");
        Ok(seeded)
    }

    async fn commit_batch(&self, batch: &[(u32, u32)]) -> Result<u64, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StoreError::TransactionError(err.to_string()))?;

        for (ipfrom, ipto) in batch {
            sqlx::query(q::INSERT_JOB)
                .bind(ipfrom)
                .bind(ipto)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|err| StoreError::TransactionError(err.to_string()))?;
        Ok(batch.len() as u64)
    }

    /// Clears every row, so a fresh bootstrap reseeds from scratch.
    /// Backs `--newdb`.
    pub async fn truncate(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM jobs").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn count_open_and_total(&self) -> Result<(i64, i64), StoreError> {
        let open: i64 = sqlx::query(q::COUNT_OPEN)
            .fetch_one(&self.pool)
            .await?
            .get(0);
        let total: i64 = sqlx::query(q::COUNT_ALL)
            .fetch_one(&self.pool)
            .await?
            .get(0);
        Ok((open, total))
    }

    pub async fn fetch_open(&self, limit: i64) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query(q::SELECT_OPEN_JOBS)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_job).collect())
    }

    pub async fn fetch_completed(&self, limit: i64) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query(q::SELECT_COMPLETED_JOBS)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_job).collect())
    }

    pub async fn mark_retrieved(&self, job_id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(q::MARK_RETRIEVED)
            .bind(job_id)
            .bind(at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Written at dispense time so the job drops out of `fetch_open`
    /// immediately, before the worker has had a chance to make any
    /// progress on it. Without this, a refill racing an in-flight job
    /// would re-select and re-dispense the same row.
    pub async fn mark_started(&self, job_id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(q::MARK_STARTED)
            .bind(job_id)
            .bind(at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Resets a previously-completed job back to the NEW state so it can be
    /// dispensed again. Used when `recycle_completed` is enabled.
    pub async fn clear_for_recycle(&self, job_id: i64) -> Result<(), StoreError> {
        sqlx::query(q::CLEAR_FOR_RECYCLE)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Idempotent: calling this twice with the same `job` value persists
    /// the same `completed_at` both times, since it is taken from the
    /// caller-supplied field rather than recomputed here.
    #[instrument(skip(self))]
    pub async fn finish_job(&self, job: &Job) -> Result<(), StoreError> {
        let started_at = job.started_at.unwrap_or_else(Utc::now);
        let completed_at = job.completed_at.unwrap_or_else(Utc::now);

        let result = sqlx::query(q::FINISH_JOB)
            .bind(job.id)
            .bind(started_at.to_rfc3339())
            .bind(completed_at.to_rfc3339())
            .bind(&job.nameserver)
            .bind(job.nxdomain_count)
            .bind(job.error_count)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::JobNotFound(job.id));
        }
        Ok(())
    }

    /// Jobs retrieved longer than `lease` ago with no completion are
    /// presumed to belong to a dead worker and are returned for recovery.
    pub async fn find_stale_dispensed(
        &self,
        lease: Duration,
        limit: i64,
    ) -> Result<Vec<Job>, StoreError> {
        let cutoff = Utc::now() - lease;
        let rows = sqlx::query(q::SELECT_STALE_DISPENSED)
            .bind(cutoff.to_rfc3339())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_job).collect())
    }

    pub async fn recover_stale(&self, job_id: i64) -> Result<(), StoreError> {
        warn!(job_id, "recovering stale job for re-dispatch");
        sqlx::query(q::RECOVER_STALE)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Job {
    Job {
        id: row.get("id"),
        ipfrom: row.get::<i64, _>("ipfrom") as u32,
        ipto: row.get::<i64, _>("ipto") as u32,
        retrieved_at: parse_ts(row.get("retrieved_at")),
        started_at: parse_ts(row.get("started_at")),
        completed_at: parse_ts(row.get("completed_at")),
        nameserver: row.get("nameserver"),
        nxdomain_count: row.get("nxdomain_count"),
        error_count: row.get("error_count"),
    }
}

fn parse_ts(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|text| DateTime::parse_from_rfc3339(&text).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_and_fetches_open_jobs() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        apply_jobs_schema(&pool).await.unwrap();
        let store = JobStore::from_pool(pool);

        let seeded = store
            .seed_jobs(vec![(0, 255), (256, 511), (512, 767)].into_iter())
            .await
            .unwrap();
        assert_eq!(seeded, 3);

        let (open, total) = store.count_open_and_total().await.unwrap();
        assert_eq!(open, 3);
        assert_eq!(total, 3);

        let jobs = store.fetch_open(10).await.unwrap();
        assert_eq!(jobs.len(), 3);
    }

    #[tokio::test]
    async fn finish_job_removes_it_from_the_open_set() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        apply_jobs_schema(&pool).await.unwrap();
        let store = JobStore::from_pool(pool);
        store.seed_jobs(std::iter::once((0, 255))).await.unwrap();

        let mut job = store.fetch_open(1).await.unwrap().remove(0);
        store.mark_retrieved(job.id, Utc::now()).await.unwrap();
        job.started_at = Some(Utc::now());
        job.nameserver = Some("8.8.8.8".to_string());
        job.nxdomain_count = Some(0);
        job.error_count = Some(0);
        store.finish_job(&job).await.unwrap();

        let (open, _total) = store.count_open_and_total().await.unwrap();
        assert_eq!(open, 0);

        let completed = store.fetch_completed(10).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn finish_unknown_job_reports_not_found() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        apply_jobs_schema(&pool).await.unwrap();
        let store = JobStore::from_pool(pool);

        let phantom = Job::new_block(999, 0, 255);
        let err = store.finish_job(&phantom).await.unwrap_err();
        assert!(matches!(err, StoreError::JobNotFound(999)));
    }

    #[tokio::test]
    async fn stale_dispensed_jobs_are_recoverable() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        apply_jobs_schema(&pool).await.unwrap();
        let store = JobStore::from_pool(pool);
        store.seed_jobs(std::iter::once((0, 255))).await.unwrap();

        let job = store.fetch_open(1).await.unwrap().remove(0);
        let old = Utc::now() - Duration::minutes(30);
        store.mark_retrieved(job.id, old).await.unwrap();

        let stale = store
            .find_stale_dispensed(Duration::minutes(10), 10)
            .await
            .unwrap();
        assert_eq!(stale.len(), 1);

        store.recover_stale(stale[0].id).await.unwrap();
        let (open, _total) = store.count_open_and_total().await.unwrap();
        assert_eq!(open, 1);
    }
}
