// ABOUTME: HTTP client for the YNAB v1 REST API
// ABOUTME: Builds per-budget URLs, authenticates with a bearer token and decodes JSON envelopes

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::models::{
    AccountsResponse, CategoriesResponse, CategoryMonthResponse, MonthsResponse, PayeesResponse,
    TransactionsResponse,
};
use super::BudgetSource;
use crate::error::{Result, SyncError};

pub const DEFAULT_API_URL: &str = "https://api.youneedabudget.com/v1";

const KNOWLEDGE_PARAM: &str = "last_knowledge_of_server";

pub struct YnabClient {
    client: Client,
    base_url: Url,
    api_key: String,
    budget_id: String,
}

impl YnabClient {
    pub fn new(api_url: &str, api_key: String, budget_id: String) -> Result<Self> {
        let base_url = Url::parse(api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| SyncError::Transport {
                url: api_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            budget_id,
        })
    }

    pub fn budget_id(&self) -> &str {
        &self.budget_id
    }

    /// `{base}/budgets/{budget_id}/{segments...}`
    fn budget_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push("budgets")
            .push(&self.budget_id)
            .extend(segments);
        Ok(url)
    }

    async fn fetch_since<T: DeserializeOwned>(&self, resource: &str, since: i64) -> Result<T> {
        let mut url = self.budget_url(&[resource])?;
        url.query_pairs_mut()
            .append_pair(KNOWLEDGE_PARAM, &since.to_string());
        self.get(url).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let target = url.to_string();

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                url: target.clone(),
                source,
            })?;

        let status = response.status();
        // Every access token is limited to 200 requests per hour.
        let rate_limit = response
            .headers()
            .get("X-Rate-Limit")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-")
            .to_string();
        tracing::debug!("GET {} {} (rate limit {})", target, status, rate_limit);

        if !(status.is_success() || status.is_redirection()) {
            return Err(SyncError::Remote {
                url: target,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| SyncError::Transport {
                url: target.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| SyncError::Decode {
            url: target,
            source,
        })
    }
}

#[async_trait]
impl BudgetSource for YnabClient {
    async fn categories(&self, since: i64) -> Result<CategoriesResponse> {
        self.fetch_since("categories", since).await
    }

    async fn months(&self, since: i64) -> Result<MonthsResponse> {
        self.fetch_since("months", since).await
    }

    async fn accounts(&self, since: i64) -> Result<AccountsResponse> {
        self.fetch_since("accounts", since).await
    }

    async fn transactions(&self, since: i64) -> Result<TransactionsResponse> {
        self.fetch_since("transactions", since).await
    }

    async fn payees(&self, since: i64) -> Result<PayeesResponse> {
        self.fetch_since("payees", since).await
    }

    async fn category_month(
        &self,
        month_id: &str,
        category_id: &str,
    ) -> Result<CategoryMonthResponse> {
        let url = self.budget_url(&["months", month_id, "categories", category_id])?;
        self.get(url).await
    }
}
