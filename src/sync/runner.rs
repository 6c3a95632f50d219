// ABOUTME: SyncRunner - orchestrates one atomic fetch/normalize/merge run
// ABOUTME: Also drives repeated runs on an interval until shutdown

use rusqlite::{Connection, Transaction};
use std::time::{Duration, Instant};
use tokio::time::interval;

use super::category_months::{sync_category_months, SkippedLookup};
use super::normalize::{
    normalize_accounts, normalize_categories, normalize_months, normalize_payees,
    normalize_transactions,
};
use crate::error::Result;
use crate::remote::BudgetSource;
use crate::store::{self, CursorStore, Cursors, Endpoint, RecordWriter};

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Configuration for the SyncRunner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum category-month lookups in flight at once
    pub concurrency: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Statistics from one sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub category_groups: usize,
    pub categories: usize,
    pub months: usize,
    pub accounts: usize,
    pub transactions: usize,
    pub subtransactions: usize,
    pub payees: usize,
    pub category_months: usize,
    pub lookups: usize,
    pub skipped_lookups: Vec<SkippedLookup>,
    pub duration_ms: u64,
}

impl SyncStats {
    pub fn rows_merged(&self) -> usize {
        self.category_groups
            + self.categories
            + self.months
            + self.accounts
            + self.transactions
            + self.subtransactions
            + self.payees
            + self.category_months
    }

    /// True when no category-month lookup had to be skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped_lookups.is_empty()
    }
}

/// SyncRunner pulls every resource from a `BudgetSource` into the local store.
///
/// A run:
/// 1. Opens one transaction and loads the cursors
/// 2. Fetches categories, months, accounts and transactions concurrently
/// 3. Merges them in that order, advancing each cursor after its merge
/// 4. Looks up every (month, category) budget snapshot
/// 5. Fetches and merges payees
/// 6. Commits, or rolls everything back on the first fatal error
pub struct SyncRunner<S> {
    source: S,
    config: RunnerConfig,
}

impl<S: BudgetSource> SyncRunner<S> {
    pub fn new(source: S, config: RunnerConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one sync. Either every change of the run is committed or none is.
    pub async fn run_once(&self, conn: &mut Connection) -> Result<SyncStats> {
        let start = Instant::now();
        let tx = conn.transaction()?;

        let result = self.sync_within(&tx).await;
        match result {
            Ok(mut stats) => {
                tx.commit()?;
                stats.duration_ms = start.elapsed().as_millis() as u64;
                tracing::info!(
                    "Sync committed: {} rows merged, {} lookups ({} skipped) in {}ms",
                    stats.rows_merged(),
                    stats.lookups,
                    stats.skipped_lookups.len(),
                    stats.duration_ms
                );
                Ok(stats)
            }
            Err(e) => {
                tracing::error!("Sync aborted, rolling back: {}", e);
                if let Err(rollback) = tx.rollback() {
                    tracing::warn!("Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    async fn sync_within(&self, tx: &Transaction<'_>) -> Result<SyncStats> {
        let cursor_store = CursorStore::new(tx);
        let writer = RecordWriter::new(tx);
        let mut cursors = cursor_store.load()?;
        let mut stats = SyncStats::default();

        // Independent of each other; merged below in dependency order.
        let (categories, months, accounts, transactions) = tokio::try_join!(
            self.source.categories(cursors.get(Endpoint::Categories)),
            self.source.months(cursors.get(Endpoint::Months)),
            self.source.accounts(cursors.get(Endpoint::Accounts)),
            self.source.transactions(cursors.get(Endpoint::Transactions)),
        )?;

        let (set, knowledge) = normalize_categories(categories);
        writer.merge_categories(&set)?;
        stats.category_groups = set.groups.len();
        stats.categories = set.categories.len();
        advance(
            &cursor_store,
            &mut cursors,
            Endpoint::Categories,
            knowledge,
            stats.category_groups + stats.categories,
        )?;

        let (records, knowledge) = normalize_months(months);
        stats.months = writer.merge(&records)?;
        advance(&cursor_store, &mut cursors, Endpoint::Months, knowledge, stats.months)?;

        let (records, knowledge) = normalize_accounts(accounts);
        stats.accounts = writer.merge(&records)?;
        advance(&cursor_store, &mut cursors, Endpoint::Accounts, knowledge, stats.accounts)?;

        let (set, knowledge) = normalize_transactions(transactions);
        writer.merge_transactions(&set)?;
        stats.transactions = set.transactions.len();
        stats.subtransactions = set.subtransactions.len();
        advance(
            &cursor_store,
            &mut cursors,
            Endpoint::Transactions,
            knowledge,
            stats.transactions + stats.subtransactions,
        )?;

        // Every known month and category, not only the ones that just changed.
        let month_ids = store::month_ids(tx)?;
        let category_ids = store::category_ids(tx)?;
        let outcome = sync_category_months(
            &self.source,
            &writer,
            &month_ids,
            &category_ids,
            self.config.concurrency,
        )
        .await?;
        stats.category_months = outcome.rows_merged;
        stats.lookups = outcome.lookups;
        stats.skipped_lookups = outcome.skipped;

        let payees = self.source.payees(cursors.get(Endpoint::Payees)).await?;
        let (records, knowledge) = normalize_payees(payees);
        stats.payees = writer.merge(&records)?;
        advance(&cursor_store, &mut cursors, Endpoint::Payees, knowledge, stats.payees)?;

        Ok(stats)
    }

    /// Run sync cycles every `every` until `shutdown` fires.
    ///
    /// A failed cycle is logged and the next tick starts over from the
    /// cursors of the last committed run.
    pub async fn run(
        &self,
        conn: &mut Connection,
        every: Duration,
        mut shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> Result<()> {
        let mut ticker = interval(every);
        let mut cycles = 0u64;

        tracing::info!("Starting sync loop with interval={:?}", every);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping sync loop");
                    break;
                }
                _ = ticker.tick() => {
                    cycles += 1;
                    tracing::info!("Starting sync cycle {}", cycles);

                    tokio::select! {
                        biased;
                        _ = shutdown.recv() => {
                            tracing::info!("Shutdown signal received during sync cycle, aborting");
                            break;
                        }
                        result = self.run_once(conn) => {
                            match result {
                                Ok(stats) => {
                                    tracing::info!(
                                        "Sync cycle {} completed: {} rows in {}ms",
                                        cycles,
                                        stats.rows_merged(),
                                        stats.duration_ms
                                    );
                                    if !stats.is_complete() {
                                        tracing::warn!(
                                            "Sync cycle {} skipped {} category-month lookups",
                                            cycles,
                                            stats.skipped_lookups.len()
                                        );
                                    }
                                }
                                Err(e) => {
                                    tracing::error!("Sync cycle {} failed: {}", cycles, e);
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn advance(
    store: &CursorStore<'_>,
    cursors: &mut Cursors,
    endpoint: Endpoint,
    knowledge: i64,
    rows: usize,
) -> Result<()> {
    let previous = cursors.get(endpoint);
    store.advance(cursors, endpoint, knowledge)?;
    tracing::info!(
        "Merged {} {} rows (server knowledge {} -> {})",
        rows,
        endpoint,
        previous,
        knowledge
    );
    Ok(())
}
