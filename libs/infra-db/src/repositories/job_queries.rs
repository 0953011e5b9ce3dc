// [libs/infra-db/src/repositories/job_queries.rs]
//! SQL text for the job store, kept in one place so the lifecycle
//! transitions in `job_store.rs` read as a sequence of named queries.

pub const INSERT_JOB: &str = r#"
    INSERT INTO jobs (ipfrom, ipto) VALUES (?1, ?2)
"#;

pub const COUNT_OPEN: &str = r#"
    SELECT COUNT(*) FROM jobs WHERE started_at IS NULL
"#;

pub const COUNT_ALL: &str = r#"
    SELECT COUNT(*) FROM jobs
"#;

pub const SELECT_OPEN_JOBS: &str = r#"
    SELECT id, ipfrom, ipto, retrieved_at, started_at, completed_at, nameserver, nxdomain_count, error_count
    FROM jobs
    WHERE started_at IS NULL AND retrieved_at IS NULL
    LIMIT ?1
"#;

pub const SELECT_COMPLETED_JOBS: &str = r#"
    SELECT id, ipfrom, ipto, retrieved_at, started_at, completed_at, nameserver, nxdomain_count, error_count
    FROM jobs
    WHERE completed_at IS NOT NULL
    LIMIT ?1
"#;

pub const SELECT_STALE_DISPENSED: &str = r#"
    SELECT id, ipfrom, ipto, retrieved_at, started_at, completed_at, nameserver, nxdomain_count, error_count
    FROM jobs
    WHERE retrieved_at IS NOT NULL AND retrieved_at < ?1 AND completed_at IS NULL
    LIMIT ?2
"#;

pub const MARK_RETRIEVED: &str = r#"
    UPDATE jobs SET retrieved_at = ?2 WHERE id = ?1
"#;

/// Written at dispense time, the instant a job is handed to a worker —
/// not when the worker later calls `finish_job`. This is what makes
/// `SELECT_OPEN_JOBS`'s `retrieved_at IS NULL` guard effective: once a
/// job is dispensed it drops out of the open set immediately, instead of
/// staying eligible for a second refill until it completes.
pub const MARK_STARTED: &str = r#"
    UPDATE jobs SET started_at = ?2 WHERE id = ?1
"#;

pub const CLEAR_FOR_RECYCLE: &str = r#"
    UPDATE jobs SET started_at = NULL, completed_at = NULL WHERE id = ?1
"#;

pub const RECOVER_STALE: &str = r#"
    UPDATE jobs SET retrieved_at = NULL, started_at = NULL WHERE id = ?1
"#;

pub const FINISH_JOB: &str = r#"
    UPDATE jobs
    SET started_at = ?2,
        completed_at = ?3,
        nameserver = ?4,
        nxdomain_count = ?5,
        error_count = ?6
    WHERE id = ?1
"#;
