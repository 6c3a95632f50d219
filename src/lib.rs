// ABOUTME: Library root for ynab-sync
// ABOUTME: Exposes the API client, local store and sync engine to the CLI and tests

pub mod config;
pub mod error;
pub mod records;
pub mod remote;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{Result, SyncError};
pub use remote::{BudgetSource, YnabClient};
pub use sync::{RunnerConfig, SyncRunner, SyncStats};
