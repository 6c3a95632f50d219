// ABOUTME: Fan-out of per-(month, category) budget lookups through a bounded pool
// ABOUTME: Fetches run concurrently; merges are drained one at a time on the calling task

use futures::stream::{self, StreamExt};

use super::normalize::normalize_category_month;
use crate::error::Result;
use crate::remote::BudgetSource;
use crate::store::RecordWriter;

/// A lookup that failed with a remote status and was left out of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLookup {
    pub month_id: String,
    pub category_id: String,
    pub status: Option<u16>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LookupOutcome {
    pub lookups: usize,
    pub rows_merged: usize,
    pub skipped: Vec<SkippedLookup>,
}

/// Fetch and merge the budget snapshot of every category in every month.
///
/// At most `concurrency` requests are in flight. A `Remote` failure for one
/// pair is logged and skipped unless it rejects the token itself (see
/// `SyncError::is_skippable_lookup`); any other error stops the pool, drops
/// the requests still in flight and is returned to the caller.
pub async fn sync_category_months<S>(
    source: &S,
    writer: &RecordWriter<'_>,
    month_ids: &[String],
    category_ids: &[String],
    concurrency: usize,
) -> Result<LookupOutcome>
where
    S: BudgetSource + ?Sized,
{
    let pairs: Vec<(&str, &str)> = month_ids
        .iter()
        .flat_map(|month| {
            category_ids
                .iter()
                .map(move |category| (month.as_str(), category.as_str()))
        })
        .collect();

    tracing::info!(
        "Fetching {} category-month snapshots ({} months x {} categories, {} concurrent)",
        pairs.len(),
        month_ids.len(),
        category_ids.len(),
        concurrency
    );

    let mut results = stream::iter(pairs)
        .map(|(month_id, category_id)| async move {
            let result = source.category_month(month_id, category_id).await;
            (month_id, category_id, result)
        })
        .buffer_unordered(concurrency.max(1));

    let mut outcome = LookupOutcome::default();
    while let Some((month_id, category_id, result)) = results.next().await {
        outcome.lookups += 1;
        match result {
            Ok(response) => {
                let rows = normalize_category_month(month_id, response);
                outcome.rows_merged += writer.merge(&rows)?;
            }
            Err(e) if e.is_skippable_lookup() => {
                tracing::warn!(
                    "Skipping category {} in month {}: {}",
                    category_id,
                    month_id,
                    e
                );
                outcome.skipped.push(SkippedLookup {
                    month_id: month_id.to_string(),
                    category_id: category_id.to_string(),
                    status: e.status(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(
                    "Category-month lookup {}/{} failed, stopping remaining lookups",
                    month_id,
                    category_id
                );
                return Err(e);
            }
        }
    }

    Ok(outcome)
}
