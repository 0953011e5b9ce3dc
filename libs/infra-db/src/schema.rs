// [libs/infra-db/src/schema.rs]
//! Idempotent schema bootstrap, run once per pool at connection time.

use sqlx::SqlitePool;

pub const JOBS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ipfrom INTEGER NOT NULL,
        ipto INTEGER NOT NULL,
        retrieved_at TEXT,
        started_at TEXT,
        completed_at TEXT,
        nameserver TEXT,
        nxdomain_count INTEGER,
        error_count INTEGER
    )
"#;

pub const JOBS_STARTED_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_jobs_started_at ON jobs(started_at)
"#;

pub const JOBS_COMPLETED_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_jobs_completed_at ON jobs(completed_at)
"#;

pub const PTRRECORDS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS ptrrecords (
        ip INTEGER PRIMARY KEY,
        ptr TEXT NOT NULL
    )
"#;

pub const PTRRECORDS_PTR_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_ptrrecords_ptr ON ptrrecords(ptr)
"#;

pub async fn apply_jobs_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(JOBS_TABLE).execute(pool).await?;
    sqlx::query(JOBS_STARTED_INDEX).execute(pool).await?;
    sqlx::query(JOBS_COMPLETED_INDEX).execute(pool).await?;
    Ok(())
}

pub async fn apply_results_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(PTRRECORDS_TABLE).execute(pool).await?;
    sqlx::query(PTRRECORDS_PTR_INDEX).execute(pool).await?;
    Ok(())
}
