// ABOUTME: Shared helpers for integration tests
// ABOUTME: JSON fixtures, an in-memory BudgetSource and a minimal HTTP fixture server

#![allow(dead_code)]

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use ynab_sync::remote::models::{
    AccountsResponse, CategoriesResponse, CategoryMonthData, CategoryMonthResponse, Envelope,
    MonthsResponse, PayeesResponse, TransactionsResponse,
};
use ynab_sync::store::Endpoint;
use ynab_sync::{BudgetSource, Result, SyncError};

pub const INTERNAL_MASTER_GROUP: &str = "e8e9fa0e-0667-4b8f-afb8-8f0c0a151a1d";
pub const BILLS_GROUP: &str = "5423a142-b27a-4a54-b6a6-adfdb31a41bc";
pub const ELECTRIC_CATEGORY: &str = "94b9ac05-6a55-4e33-8f52-65931515da96";
pub const WATER_CATEGORY: &str = "7d3b19a3-a347-4a10-befc-b966f278aa3e";
pub const HUGO_TRANSACTION: &str = "295c1843-14dd-46ed-bed5-3d02c17a82db";
pub const CHECKER_ACCOUNT: &str = "9a329f5e-1eca-40c6-8ba1-a19b0d8cadd1";
pub const DECEMBER: &str = "2022-12-01";
pub const NOVEMBER: &str = "2022-11-01";

/// `server_knowledge` reported by each incremental fixture.
pub fn fixture_knowledge(endpoint: Endpoint) -> i64 {
    match endpoint {
        Endpoint::Categories => 98,
        Endpoint::Months => 101,
        Endpoint::Accounts => 103,
        Endpoint::Transactions => 107,
        Endpoint::Payees => 111,
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

pub fn fixture<T: DeserializeOwned>(name: &str) -> T {
    serde_json::from_str(&fixture_text(name)).unwrap()
}

/// Failure a `FixtureSource` can be told to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Status(u16),
    Decode,
}

impl Failure {
    fn into_error(self, url: String) -> SyncError {
        match self {
            Failure::Status(status) => SyncError::Remote { url, status },
            Failure::Decode => SyncError::Decode {
                url,
                source: serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
            },
        }
    }
}

/// Payloads served by a `FixtureSource`. Tests may edit them between runs.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub categories: CategoriesResponse,
    pub months: MonthsResponse,
    pub accounts: AccountsResponse,
    pub transactions: TransactionsResponse,
    pub payees: PayeesResponse,
    pub category_months: HashMap<(String, String), CategoryMonthResponse>,
}

impl Fixtures {
    pub fn load() -> Self {
        let mut category_months = HashMap::new();
        category_months.insert(
            (DECEMBER.to_string(), ELECTRIC_CATEGORY.to_string()),
            fixture("category-month.json"),
        );

        Self {
            categories: fixture("categories.json"),
            months: fixture("months.json"),
            accounts: fixture("accounts.json"),
            transactions: fixture("transactions.json"),
            payees: fixture("payees.json"),
            category_months,
        }
    }
}

/// In-memory `BudgetSource` that honors `since` like the real API: a cursor
/// at or past the fixture's server knowledge yields an empty delta.
pub struct FixtureSource {
    fixtures: Mutex<Fixtures>,
    failures: Mutex<HashMap<String, Failure>>,
    lookup_failures: Mutex<HashMap<(String, String), Failure>>,
    calls: Mutex<Vec<(String, i64)>>,
    lookups: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FixtureSource {
    pub fn new(fixtures: Fixtures) -> Self {
        Self {
            fixtures: Mutex::new(fixtures),
            failures: Mutex::new(HashMap::new()),
            lookup_failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn load() -> Self {
        Self::new(Fixtures::load())
    }

    pub fn edit(&self, f: impl FnOnce(&mut Fixtures)) {
        f(&mut self.fixtures.lock().unwrap());
    }

    pub fn fail(&self, endpoint: &str, failure: Failure) {
        self.failures
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), failure);
    }

    pub fn fail_lookup(&self, month_id: &str, category_id: &str, failure: Failure) {
        self.lookup_failures
            .lock()
            .unwrap()
            .insert((month_id.to_string(), category_id.to_string()), failure);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
        self.lookup_failures.lock().unwrap().clear();
    }

    /// `(endpoint, since)` for every incremental fetch, in call order.
    pub fn calls(&self) -> Vec<(String, i64)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn since_of(&self, endpoint: &str) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter(|(name, _)| name == endpoint)
            .map(|(_, since)| since)
            .collect()
    }

    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, endpoint: &str, since: i64) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), since));
        match self.failures.lock().unwrap().get(endpoint) {
            Some(failure) => Err(failure.into_error(format!("fixture://{}", endpoint))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BudgetSource for FixtureSource {
    async fn categories(&self, since: i64) -> Result<CategoriesResponse> {
        self.record("categories", since)?;
        let mut response = self.fixtures.lock().unwrap().categories.clone();
        if since >= response.data.server_knowledge {
            response.data.category_groups.clear();
        }
        Ok(response)
    }

    async fn months(&self, since: i64) -> Result<MonthsResponse> {
        self.record("months", since)?;
        let mut response = self.fixtures.lock().unwrap().months.clone();
        if since >= response.data.server_knowledge {
            response.data.months.clear();
        }
        Ok(response)
    }

    async fn accounts(&self, since: i64) -> Result<AccountsResponse> {
        self.record("accounts", since)?;
        let mut response = self.fixtures.lock().unwrap().accounts.clone();
        if since >= response.data.server_knowledge {
            response.data.accounts.clear();
        }
        Ok(response)
    }

    async fn transactions(&self, since: i64) -> Result<TransactionsResponse> {
        self.record("transactions", since)?;
        let mut response = self.fixtures.lock().unwrap().transactions.clone();
        if since >= response.data.server_knowledge {
            response.data.transactions.clear();
        }
        Ok(response)
    }

    async fn payees(&self, since: i64) -> Result<PayeesResponse> {
        self.record("payees", since)?;
        let mut response = self.fixtures.lock().unwrap().payees.clone();
        if since >= response.data.server_knowledge {
            response.data.payees.clear();
        }
        Ok(response)
    }

    async fn category_month(
        &self,
        month_id: &str,
        category_id: &str,
    ) -> Result<CategoryMonthResponse> {
        let key = (month_id.to_string(), category_id.to_string());
        self.lookups.lock().unwrap().push(key.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let url = format!("fixture://months/{}/categories/{}", month_id, category_id);
        if let Some(failure) = self.lookup_failures.lock().unwrap().get(&key) {
            return Err(failure.into_error(url));
        }

        let fixtures = self.fixtures.lock().unwrap();
        if let Some(response) = fixtures.category_months.get(&key) {
            return Ok(response.clone());
        }
        fixtures
            .categories
            .data
            .category_groups
            .iter()
            .flat_map(|group| group.categories.iter())
            .find(|category| category.id == category_id)
            .map(|category| Envelope {
                data: CategoryMonthData {
                    category: category.clone(),
                },
            })
            .ok_or(SyncError::Remote { url, status: 404 })
    }
}

/// One request seen by the `FixtureServer`.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// Plain HTTP/1.1 server answering canned `(status, body)` pairs by path.
/// Unknown paths get a YNAB-style 404.
pub struct FixtureServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FixtureServer {
    pub async fn start(routes: HashMap<String, (u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let routes = Arc::clone(&routes);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&buf).to_string();
                    let mut lines = head.lines();
                    let target = lines
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("/")
                        .to_string();
                    let authorization = lines
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
                        .map(|(_, value)| value.trim().to_string());
                    let (path, query) = match target.split_once('?') {
                        Some((path, query)) => (path.to_string(), Some(query.to_string())),
                        None => (target.clone(), None),
                    };

                    recorded.lock().unwrap().push(RecordedRequest {
                        path: path.clone(),
                        query,
                        authorization,
                    });

                    let (status, body) = routes.get(&path).cloned().unwrap_or_else(|| {
                        (
                            404,
                            r#"{"error":{"id":"404.2","name":"resource_not_found","detail":"Resource not found"}}"#
                                .to_string(),
                        )
                    });
                    let response = format!(
                        "HTTP/1.1 {} Fixture\r\nContent-Type: application/json\r\nContent-Length: {}\r\nX-Rate-Limit: 1/200\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, requests }
    }

    /// API base URL with the `/v1` prefix the real service uses.
    pub fn api_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Routes serving every fixture for `budget_id`, including one
/// category-month body per (month, category) pair.
pub fn budget_routes(budget_id: &str) -> HashMap<String, (u16, String)> {
    let base = format!("/v1/budgets/{}", budget_id);
    let mut routes = HashMap::new();
    for (resource, file) in [
        ("categories", "categories.json"),
        ("months", "months.json"),
        ("accounts", "accounts.json"),
        ("transactions", "transactions.json"),
        ("payees", "payees.json"),
    ] {
        routes.insert(format!("{}/{}", base, resource), (200, fixture_text(file)));
    }

    let categories: serde_json::Value = fixture("categories.json");
    let months: serde_json::Value = fixture("months.json");
    for month in months["data"]["months"].as_array().unwrap() {
        let month_id = month["month"].as_str().unwrap();
        for group in categories["data"]["category_groups"].as_array().unwrap() {
            for category in group["categories"].as_array().unwrap() {
                let category_id = category["id"].as_str().unwrap();
                let body = serde_json::json!({ "data": { "category": category } });
                routes.insert(
                    format!("{}/months/{}/categories/{}", base, month_id, category_id),
                    (200, body.to_string()),
                );
            }
        }
    }
    routes
}
