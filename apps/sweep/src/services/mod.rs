// [apps/sweep/src/services/mod.rs]
pub mod coordinator;
pub mod reaper;
pub mod worker;
