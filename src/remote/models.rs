// ABOUTME: Response payloads returned by the YNAB v1 API
// ABOUTME: One tagged type per resource kind, decoded straight from the JSON body

use serde::Deserialize;

/// Every YNAB response wraps its payload in a `data` object.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// GET /budgets/{budget_id}/categories
pub type CategoriesResponse = Envelope<CategoriesData>;
/// GET /budgets/{budget_id}/months
pub type MonthsResponse = Envelope<MonthsData>;
/// GET /budgets/{budget_id}/months/{month_id}/categories/{category_id}
pub type CategoryMonthResponse = Envelope<CategoryMonthData>;
/// GET /budgets/{budget_id}/accounts
pub type AccountsResponse = Envelope<AccountsData>;
/// GET /budgets/{budget_id}/transactions
pub type TransactionsResponse = Envelope<TransactionsData>;
/// GET /budgets/{budget_id}/payees
pub type PayeesResponse = Envelope<PayeesData>;

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesData {
    #[serde(default)]
    pub category_groups: Vec<CategoryGroupPayload>,
    pub server_knowledge: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryGroupPayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub categories: Vec<CategoryPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPayload {
    pub id: String,
    pub category_group_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    pub original_category_group_id: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub budgeted: i64,
    #[serde(default)]
    pub activity: i64,
    #[serde(default)]
    pub balance: i64,
    pub goal_type: Option<String>,
    pub goal_creation_month: Option<String>,
    pub goal_target: Option<i64>,
    pub goal_target_month: Option<String>,
    pub goal_percentage_complete: Option<i64>,
    pub goal_months_to_budget: Option<i64>,
    pub goal_under_funded: Option<i64>,
    pub goal_overall_funded: Option<i64>,
    pub goal_overall_left: Option<i64>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthsData {
    #[serde(default)]
    pub months: Vec<MonthPayload>,
    pub server_knowledge: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthPayload {
    /// Calendar month as `YYYY-MM-DD` (always the first of the month).
    pub month: String,
    pub note: Option<String>,
    #[serde(default)]
    pub income: i64,
    #[serde(default)]
    pub budgeted: i64,
    #[serde(default)]
    pub activity: i64,
    #[serde(default)]
    pub to_be_budgeted: i64,
    pub age_of_money: Option<i64>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMonthData {
    pub category: CategoryPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsData {
    #[serde(default)]
    pub accounts: Vec<AccountPayload>,
    pub server_knowledge: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountPayload {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub on_budget: bool,
    #[serde(default)]
    pub closed: bool,
    pub note: Option<String>,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub cleared_balance: i64,
    #[serde(default)]
    pub uncleared_balance: i64,
    pub transfer_payee_id: Option<String>,
    #[serde(default)]
    pub direct_import_linked: bool,
    #[serde(default)]
    pub direct_import_in_error: bool,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsData {
    #[serde(default)]
    pub transactions: Vec<TransactionPayload>,
    pub server_knowledge: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionPayload {
    pub id: String,
    pub date: String,
    pub amount: i64,
    pub memo: Option<String>,
    pub cleared: String,
    #[serde(default)]
    pub approved: bool,
    pub flag_color: Option<String>,
    pub account_id: String,
    pub payee_id: Option<String>,
    pub category_id: Option<String>,
    pub transfer_account_id: Option<String>,
    pub transfer_transaction_id: Option<String>,
    pub matched_transaction_id: Option<String>,
    pub import_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    pub account_name: Option<String>,
    pub payee_name: Option<String>,
    pub category_name: Option<String>,
    #[serde(default)]
    pub subtransactions: Vec<SubtransactionPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubtransactionPayload {
    pub id: String,
    pub transaction_id: Option<String>,
    pub amount: i64,
    pub memo: Option<String>,
    pub payee_id: Option<String>,
    pub payee_name: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub transfer_account_id: Option<String>,
    pub transfer_transaction_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayeesData {
    #[serde(default)]
    pub payees: Vec<PayeePayload>,
    pub server_knowledge: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayeePayload {
    pub id: String,
    pub name: String,
    pub transfer_account_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}
