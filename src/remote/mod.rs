// ABOUTME: Remote resource fetchers for the YNAB budget API
// ABOUTME: Defines the BudgetSource seam and its HTTP implementation

pub mod client;
pub mod models;

use async_trait::async_trait;

use crate::error::Result;
use models::{
    AccountsResponse, CategoriesResponse, CategoryMonthResponse, MonthsResponse, PayeesResponse,
    TransactionsResponse,
};

pub use client::YnabClient;

/// Source of raw budget payloads.
///
/// The incremental methods take the last known server knowledge and return
/// only what changed since then (everything when `since` is 0). The
/// category-month lookup has no cursor and always returns the current value.
#[async_trait]
pub trait BudgetSource: Send + Sync {
    async fn categories(&self, since: i64) -> Result<CategoriesResponse>;

    async fn months(&self, since: i64) -> Result<MonthsResponse>;

    async fn accounts(&self, since: i64) -> Result<AccountsResponse>;

    async fn transactions(&self, since: i64) -> Result<TransactionsResponse>;

    async fn payees(&self, since: i64) -> Result<PayeesResponse>;

    async fn category_month(
        &self,
        month_id: &str,
        category_id: &str,
    ) -> Result<CategoryMonthResponse>;
}
