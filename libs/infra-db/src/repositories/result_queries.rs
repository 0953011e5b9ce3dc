// [libs/infra-db/src/repositories/result_queries.rs]
//! SQL text for the PTR result store.

pub const UPSERT_PTR: &str = r#"
    INSERT INTO ptrrecords (ip, ptr) VALUES (?1, ?2)
    ON CONFLICT(ip) DO UPDATE SET ptr = excluded.ptr
"#;

pub const SELECT_PTR: &str = r#"
    SELECT ptr FROM ptrrecords WHERE ip = ?1
"#;

pub const COUNT_PTR: &str = r#"
    SELECT COUNT(*) FROM ptrrecords
"#;
