// ABOUTME: Flat relational records produced by normalization
// ABOUTME: Each struct maps one-to-one onto a table in the local store

/// Category groups together with the categories they own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySet {
    pub groups: Vec<CategoryGroupRecord>,
    pub categories: Vec<CategoryRecord>,
}

/// Transactions together with their split lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionSet {
    pub transactions: Vec<TransactionRecord>,
    pub subtransactions: Vec<SubtransactionRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroupRecord {
    pub id: String,
    pub name: String,
    pub hidden: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub id: String,
    pub category_group_id: String,
    pub name: String,
    pub note: Option<String>,
    pub hidden: bool,
    pub deleted: bool,
    pub goal_type: Option<String>,
    pub goal_creation_month: Option<String>,
    pub goal_target: Option<i64>,
    pub goal_target_month: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthRecord {
    pub id: String,
    pub note: Option<String>,
    pub income: i64,
    pub budgeted: i64,
    pub activity: i64,
    pub to_be_budgeted: i64,
    pub age_of_money: Option<i64>,
    pub deleted: bool,
}

/// Budget allocation of one category within one month.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMonthRecord {
    pub month_id: String,
    pub category_id: String,
    pub budgeted: i64,
    pub activity: i64,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub on_budget: bool,
    pub closed: bool,
    pub note: Option<String>,
    pub balance: i64,
    pub cleared_balance: i64,
    pub uncleared_balance: i64,
    pub transfer_payee_id: Option<String>,
    pub direct_import_linked: bool,
    pub direct_import_in_error: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: String,
    pub date: String,
    /// Milliunits of the budget currency.
    pub amount: i64,
    pub memo: Option<String>,
    pub cleared: String,
    pub approved: bool,
    pub flag_color: Option<String>,
    pub account_id: String,
    pub payee_id: Option<String>,
    pub category_id: Option<String>,
    pub transfer_account_id: Option<String>,
    pub transfer_transaction_id: Option<String>,
    pub matched_transaction_id: Option<String>,
    pub import_id: Option<String>,
    pub deleted: bool,
    pub account_name: Option<String>,
    pub payee_name: Option<String>,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtransactionRecord {
    pub id: String,
    pub transaction_id: String,
    pub amount: i64,
    pub memo: Option<String>,
    pub payee_id: Option<String>,
    pub payee_name: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub transfer_account_id: Option<String>,
    pub transfer_transaction_id: Option<String>,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayeeRecord {
    pub id: String,
    pub name: String,
    pub transfer_account_id: Option<String>,
    pub deleted: bool,
}
