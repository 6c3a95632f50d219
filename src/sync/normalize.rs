// ABOUTME: Flattens nested YNAB payloads into relational record sets
// ABOUTME: One function per nesting pattern; children always inherit their parent's id

use crate::records::{
    AccountRecord, CategoryGroupRecord, CategoryMonthRecord, CategoryRecord, CategorySet,
    MonthRecord, PayeeRecord, SubtransactionRecord, TransactionRecord, TransactionSet,
};
use crate::remote::models::{
    AccountsResponse, CategoriesResponse, CategoryMonthResponse, CategoryPayload, MonthsResponse,
    PayeesResponse, TransactionsResponse,
};

/// Groups and categories, plus the categories endpoint's new server knowledge.
pub fn normalize_categories(response: CategoriesResponse) -> (CategorySet, i64) {
    let data = response.data;
    let mut set = CategorySet::default();

    for group in data.category_groups {
        for category in group.categories {
            set.categories.push(category_record(&group.id, category));
        }
        set.groups.push(CategoryGroupRecord {
            id: group.id,
            name: group.name,
            hidden: group.hidden,
            deleted: group.deleted,
        });
    }

    (set, data.server_knowledge)
}

fn category_record(group_id: &str, category: CategoryPayload) -> CategoryRecord {
    CategoryRecord {
        id: category.id,
        category_group_id: group_id.to_string(),
        name: category.name,
        note: category.note,
        hidden: category.hidden,
        deleted: category.deleted,
        goal_type: category.goal_type,
        goal_creation_month: category.goal_creation_month,
        goal_target: category.goal_target,
        goal_target_month: category.goal_target_month,
    }
}

pub fn normalize_months(response: MonthsResponse) -> (Vec<MonthRecord>, i64) {
    let data = response.data;
    let months = data
        .months
        .into_iter()
        .map(|month| MonthRecord {
            id: month.month,
            note: month.note,
            income: month.income,
            budgeted: month.budgeted,
            activity: month.activity,
            to_be_budgeted: month.to_be_budgeted,
            age_of_money: month.age_of_money,
            deleted: month.deleted,
        })
        .collect();
    (months, data.server_knowledge)
}

/// Category-month rows for `month_id`. This endpoint carries no watermark.
pub fn normalize_category_month(
    month_id: &str,
    response: CategoryMonthResponse,
) -> Vec<CategoryMonthRecord> {
    let category = response.data.category;
    vec![CategoryMonthRecord {
        month_id: month_id.to_string(),
        category_id: category.id,
        budgeted: category.budgeted,
        activity: category.activity,
        balance: category.balance,
    }]
}

pub fn normalize_accounts(response: AccountsResponse) -> (Vec<AccountRecord>, i64) {
    let data = response.data;
    let accounts = data
        .accounts
        .into_iter()
        .map(|account| AccountRecord {
            id: account.id,
            name: account.name,
            account_type: account.account_type,
            on_budget: account.on_budget,
            closed: account.closed,
            note: account.note,
            balance: account.balance,
            cleared_balance: account.cleared_balance,
            uncleared_balance: account.uncleared_balance,
            transfer_payee_id: account.transfer_payee_id,
            direct_import_linked: account.direct_import_linked,
            direct_import_in_error: account.direct_import_in_error,
            deleted: account.deleted,
        })
        .collect();
    (accounts, data.server_knowledge)
}

/// Transactions and their split lines, plus the new server knowledge.
pub fn normalize_transactions(response: TransactionsResponse) -> (TransactionSet, i64) {
    let data = response.data;
    let mut set = TransactionSet::default();

    for transaction in data.transactions {
        for sub in transaction.subtransactions {
            set.subtransactions.push(SubtransactionRecord {
                id: sub.id,
                transaction_id: transaction.id.clone(),
                amount: sub.amount,
                memo: sub.memo,
                payee_id: sub.payee_id,
                payee_name: sub.payee_name,
                category_id: sub.category_id,
                category_name: sub.category_name,
                transfer_account_id: sub.transfer_account_id,
                transfer_transaction_id: sub.transfer_transaction_id,
                deleted: sub.deleted,
            });
        }
        set.transactions.push(TransactionRecord {
            id: transaction.id,
            date: transaction.date,
            amount: transaction.amount,
            memo: transaction.memo,
            cleared: transaction.cleared,
            approved: transaction.approved,
            flag_color: transaction.flag_color,
            account_id: transaction.account_id,
            payee_id: transaction.payee_id,
            category_id: transaction.category_id,
            transfer_account_id: transaction.transfer_account_id,
            transfer_transaction_id: transaction.transfer_transaction_id,
            matched_transaction_id: transaction.matched_transaction_id,
            import_id: transaction.import_id,
            deleted: transaction.deleted,
            account_name: transaction.account_name,
            payee_name: transaction.payee_name,
            category_name: transaction.category_name,
        });
    }

    (set, data.server_knowledge)
}

pub fn normalize_payees(response: PayeesResponse) -> (Vec<PayeeRecord>, i64) {
    let data = response.data;
    let payees = data
        .payees
        .into_iter()
        .map(|payee| PayeeRecord {
            id: payee.id,
            name: payee.name,
            transfer_account_id: payee.transfer_account_id,
            deleted: payee.deleted,
        })
        .collect();
    (payees, data.server_knowledge)
}
