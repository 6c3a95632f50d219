// ABOUTME: Incremental sync engine for mirroring a YNAB budget
// ABOUTME: Normalization, category-month fan-out and the run orchestrator

pub mod category_months;
pub mod normalize;
pub mod runner;

pub use category_months::{sync_category_months, LookupOutcome, SkippedLookup};
pub use runner::{RunnerConfig, SyncRunner, SyncStats, DEFAULT_CONCURRENCY};
