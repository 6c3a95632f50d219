// ABOUTME: RecordWriter - merges normalized records into the local store
// ABOUTME: Uses INSERT ... ON CONFLICT DO UPDATE so the remote copy always wins

use rusqlite::{params, Connection, Statement};

use crate::error::Result;
use crate::records::{
    AccountRecord, CategoryGroupRecord, CategoryMonthRecord, CategoryRecord, CategorySet,
    MonthRecord, PayeeRecord, SubtransactionRecord, TransactionRecord, TransactionSet,
};

/// A record that can be merged into its table by primary key.
///
/// `SQL` must insert every column and, on a key conflict, overwrite every
/// non-key column with the incoming value.
pub trait Upsert {
    const TABLE: &'static str;
    const SQL: &'static str;

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

/// Writes record sets through the caller's connection.
///
/// The writer never commits. Hand it the run's `rusqlite::Transaction` so
/// every merge lands in the same unit of work.
pub struct RecordWriter<'a> {
    conn: &'a Connection,
}

impl<'a> RecordWriter<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Merge a batch of records of one kind. Returns the number of rows written.
    pub fn merge<T: Upsert>(&self, records: &[T]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut stmt = self.conn.prepare_cached(T::SQL)?;
        let mut affected = 0;
        for record in records {
            affected += record.execute(&mut stmt)?;
        }

        tracing::debug!("Merged {} rows into {}", affected, T::TABLE);
        Ok(affected)
    }

    /// Merge groups first, then the categories they own.
    pub fn merge_categories(&self, set: &CategorySet) -> Result<usize> {
        let groups = self.merge(&set.groups)?;
        let categories = self.merge(&set.categories)?;
        Ok(groups + categories)
    }

    /// Merge transactions first, then their split lines.
    pub fn merge_transactions(&self, set: &TransactionSet) -> Result<usize> {
        let transactions = self.merge(&set.transactions)?;
        let subtransactions = self.merge(&set.subtransactions)?;
        Ok(transactions + subtransactions)
    }
}

impl Upsert for CategoryGroupRecord {
    const TABLE: &'static str = "category_group";
    const SQL: &'static str = "
        INSERT INTO category_group (id, name, hidden, deleted)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            hidden = excluded.hidden,
            deleted = excluded.deleted";

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.id, self.name, self.hidden, self.deleted])
    }
}

impl Upsert for CategoryRecord {
    const TABLE: &'static str = "category";
    const SQL: &'static str = "
        INSERT INTO category (
            id, category_group_id, name, note, hidden, deleted,
            goal_type, goal_creation_month, goal_target, goal_target_month
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(id) DO UPDATE SET
            category_group_id = excluded.category_group_id,
            name = excluded.name,
            note = excluded.note,
            hidden = excluded.hidden,
            deleted = excluded.deleted,
            goal_type = excluded.goal_type,
            goal_creation_month = excluded.goal_creation_month,
            goal_target = excluded.goal_target,
            goal_target_month = excluded.goal_target_month";

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.category_group_id,
            self.name,
            self.note,
            self.hidden,
            self.deleted,
            self.goal_type,
            self.goal_creation_month,
            self.goal_target,
            self.goal_target_month,
        ])
    }
}

impl Upsert for MonthRecord {
    const TABLE: &'static str = "month";
    const SQL: &'static str = "
        INSERT INTO month (
            id, note, income, budgeted, activity, to_be_budgeted, age_of_money, deleted
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
            note = excluded.note,
            income = excluded.income,
            budgeted = excluded.budgeted,
            activity = excluded.activity,
            to_be_budgeted = excluded.to_be_budgeted,
            age_of_money = excluded.age_of_money,
            deleted = excluded.deleted";

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.note,
            self.income,
            self.budgeted,
            self.activity,
            self.to_be_budgeted,
            self.age_of_money,
            self.deleted,
        ])
    }
}

impl Upsert for CategoryMonthRecord {
    const TABLE: &'static str = "category_month";
    const SQL: &'static str = "
        INSERT INTO category_month (month_id, category_id, budgeted, activity, balance)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(month_id, category_id) DO UPDATE SET
            budgeted = excluded.budgeted,
            activity = excluded.activity,
            balance = excluded.balance";

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.month_id,
            self.category_id,
            self.budgeted,
            self.activity,
            self.balance,
        ])
    }
}

impl Upsert for AccountRecord {
    const TABLE: &'static str = "account";
    const SQL: &'static str = "
        INSERT INTO account (
            id, name, type, on_budget, closed, note, balance, cleared_balance,
            uncleared_balance, transfer_payee_id, direct_import_linked,
            direct_import_in_error, deleted
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            type = excluded.type,
            on_budget = excluded.on_budget,
            closed = excluded.closed,
            note = excluded.note,
            balance = excluded.balance,
            cleared_balance = excluded.cleared_balance,
            uncleared_balance = excluded.uncleared_balance,
            transfer_payee_id = excluded.transfer_payee_id,
            direct_import_linked = excluded.direct_import_linked,
            direct_import_in_error = excluded.direct_import_in_error,
            deleted = excluded.deleted";

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.name,
            self.account_type,
            self.on_budget,
            self.closed,
            self.note,
            self.balance,
            self.cleared_balance,
            self.uncleared_balance,
            self.transfer_payee_id,
            self.direct_import_linked,
            self.direct_import_in_error,
            self.deleted,
        ])
    }
}

impl Upsert for TransactionRecord {
    const TABLE: &'static str = "transaction";
    const SQL: &'static str = r#"
        INSERT INTO "transaction" (
            id, date, amount, memo, cleared, approved, flag_color,
            account_id, payee_id, category_id, transfer_account_id,
            transfer_transaction_id, matched_transaction_id, import_id, deleted,
            account_name, payee_name, category_name
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
        ON CONFLICT(id) DO UPDATE SET
            date = excluded.date,
            amount = excluded.amount,
            memo = excluded.memo,
            cleared = excluded.cleared,
            approved = excluded.approved,
            flag_color = excluded.flag_color,
            account_id = excluded.account_id,
            payee_id = excluded.payee_id,
            category_id = excluded.category_id,
            transfer_account_id = excluded.transfer_account_id,
            transfer_transaction_id = excluded.transfer_transaction_id,
            matched_transaction_id = excluded.matched_transaction_id,
            import_id = excluded.import_id,
            deleted = excluded.deleted,
            account_name = excluded.account_name,
            payee_name = excluded.payee_name,
            category_name = excluded.category_name"#;

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.date,
            self.amount,
            self.memo,
            self.cleared,
            self.approved,
            self.flag_color,
            self.account_id,
            self.payee_id,
            self.category_id,
            self.transfer_account_id,
            self.transfer_transaction_id,
            self.matched_transaction_id,
            self.import_id,
            self.deleted,
            self.account_name,
            self.payee_name,
            self.category_name,
        ])
    }
}

impl Upsert for SubtransactionRecord {
    const TABLE: &'static str = "subtransaction";
    const SQL: &'static str = "
        INSERT INTO subtransaction (
            id, transaction_id, amount, memo, payee_id, payee_name, category_id,
            category_name, transfer_account_id, transfer_transaction_id, deleted
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(id) DO UPDATE SET
            transaction_id = excluded.transaction_id,
            amount = excluded.amount,
            memo = excluded.memo,
            payee_id = excluded.payee_id,
            payee_name = excluded.payee_name,
            category_id = excluded.category_id,
            category_name = excluded.category_name,
            transfer_account_id = excluded.transfer_account_id,
            transfer_transaction_id = excluded.transfer_transaction_id,
            deleted = excluded.deleted";

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.transaction_id,
            self.amount,
            self.memo,
            self.payee_id,
            self.payee_name,
            self.category_id,
            self.category_name,
            self.transfer_account_id,
            self.transfer_transaction_id,
            self.deleted,
        ])
    }
}

impl Upsert for PayeeRecord {
    const TABLE: &'static str = "payee";
    const SQL: &'static str = "
        INSERT INTO payee (id, name, transfer_account_id, deleted)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            transfer_account_id = excluded.transfer_account_id,
            deleted = excluded.deleted";

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.name,
            self.transfer_account_id,
            self.deleted,
        ])
    }
}
