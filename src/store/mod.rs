// ABOUTME: Local SQLite store for mirrored budget data
// ABOUTME: Opens the database, applies the idempotent schema and answers id/count queries

pub mod cursor;
pub mod writer;

use anyhow::Context;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::Path;

use crate::error::Result;

pub use cursor::{CursorEntry, CursorStore, Cursors, Endpoint};
pub use writer::{RecordWriter, Upsert};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS server_knowledge (
    endpoint    TEXT NOT NULL PRIMARY KEY,
    value       INTEGER NOT NULL DEFAULT 0,
    updated_at  TEXT
);

INSERT INTO server_knowledge(endpoint, value) VALUES
    ('categories',   0),
    ('months',       0),
    ('accounts',     0),
    ('transactions', 0),
    ('payees',       0)
    ON CONFLICT(endpoint) DO NOTHING;

CREATE TABLE IF NOT EXISTS category_group (
    id       TEXT NOT NULL PRIMARY KEY,
    name     TEXT NOT NULL,
    hidden   INTEGER NOT NULL DEFAULT 0,
    deleted  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS category (
    id                   TEXT NOT NULL PRIMARY KEY,
    category_group_id    TEXT NOT NULL REFERENCES category_group(id),
    name                 TEXT NOT NULL,
    note                 TEXT,
    hidden               INTEGER NOT NULL DEFAULT 0,
    deleted              INTEGER NOT NULL DEFAULT 0,
    goal_type            TEXT,
    goal_creation_month  TEXT,
    goal_target          INTEGER,
    goal_target_month    TEXT
);

CREATE TABLE IF NOT EXISTS month (
    id              TEXT NOT NULL PRIMARY KEY,
    note            TEXT,
    income          INTEGER NOT NULL DEFAULT 0,
    budgeted        INTEGER NOT NULL DEFAULT 0,
    activity        INTEGER NOT NULL DEFAULT 0,
    to_be_budgeted  INTEGER NOT NULL DEFAULT 0,
    age_of_money    INTEGER,
    deleted         INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS category_month (
    month_id     TEXT NOT NULL REFERENCES month(id),
    category_id  TEXT NOT NULL REFERENCES category(id),
    budgeted     INTEGER NOT NULL DEFAULT 0,
    activity     INTEGER NOT NULL DEFAULT 0,
    balance      INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (month_id, category_id)
);

CREATE TABLE IF NOT EXISTS account (
    id                      TEXT NOT NULL PRIMARY KEY,
    name                    TEXT NOT NULL,
    type                    TEXT NOT NULL,
    on_budget               INTEGER NOT NULL DEFAULT 0,
    closed                  INTEGER NOT NULL DEFAULT 0,
    note                    TEXT,
    balance                 INTEGER NOT NULL DEFAULT 0,
    cleared_balance         INTEGER NOT NULL DEFAULT 0,
    uncleared_balance       INTEGER NOT NULL DEFAULT 0,
    transfer_payee_id       TEXT,
    direct_import_linked    INTEGER NOT NULL DEFAULT 0,
    direct_import_in_error  INTEGER NOT NULL DEFAULT 0,
    deleted                 INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS "transaction" (
    id                       TEXT NOT NULL PRIMARY KEY,
    date                     TEXT NOT NULL,
    amount                   INTEGER NOT NULL,
    memo                     TEXT,
    cleared                  TEXT NOT NULL,
    approved                 INTEGER NOT NULL DEFAULT 0,
    flag_color               TEXT,
    account_id               TEXT NOT NULL,
    payee_id                 TEXT,
    category_id              TEXT,
    transfer_account_id      TEXT,
    transfer_transaction_id  TEXT,
    matched_transaction_id   TEXT,
    import_id                TEXT,
    deleted                  INTEGER NOT NULL DEFAULT 0,
    account_name             TEXT,
    payee_name               TEXT,
    category_name            TEXT
);

CREATE TABLE IF NOT EXISTS subtransaction (
    id                       TEXT NOT NULL PRIMARY KEY,
    transaction_id           TEXT NOT NULL REFERENCES "transaction"(id),
    amount                   INTEGER NOT NULL,
    memo                     TEXT,
    payee_id                 TEXT,
    payee_name               TEXT,
    category_id              TEXT,
    category_name            TEXT,
    transfer_account_id      TEXT,
    transfer_transaction_id  TEXT,
    deleted                  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS payee (
    id                   TEXT NOT NULL PRIMARY KEY,
    name                 TEXT NOT NULL,
    transfer_account_id  TEXT,
    deleted              INTEGER NOT NULL DEFAULT 0
);
"#;

/// Entity tables reported by `status`, in dependency order.
pub const ENTITY_TABLES: [&str; 8] = [
    "category_group",
    "category",
    "month",
    "category_month",
    "account",
    "transaction",
    "subtransaction",
    "payee",
];

/// Open (or create) the sync database at `path` and bring its schema up to date.
pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open sync database {}", path.display()))?;
    conn.pragma_update(None, "journal_mode", "wal")
        .context("failed to enable WAL for sync database")?;
    init_schema(&conn).context("failed to initialize sync schema")?;

    tracing::debug!("Opened sync database {}", path.display());
    Ok(conn)
}

/// Open an existing sync database for reporting. Never creates, migrates or
/// switches the journal mode of the file.
pub fn open_read_only(path: impl AsRef<Path>) -> anyhow::Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open sync database {} read-only", path.display()))?;
    Ok(conn)
}

/// In-memory database with the full schema applied.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Apply the schema. Safe to call on every start.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Every month id currently stored, oldest first.
pub fn month_ids(conn: &Connection) -> Result<Vec<String>> {
    collect_ids(conn, "SELECT id FROM month ORDER BY id")
}

/// Every category id currently stored.
pub fn category_ids(conn: &Connection) -> Result<Vec<String>> {
    collect_ids(conn, "SELECT id FROM category ORDER BY id")
}

fn collect_ids(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

/// Row count for every entity table.
pub fn row_counts(conn: &Connection) -> Result<Vec<(&'static str, i64)>> {
    ENTITY_TABLES
        .iter()
        .map(|table| -> Result<(&'static str, i64)> {
            let count: i64 =
                conn.query_row(&format!(r#"SELECT COUNT(*) FROM "{}""#, table), [], |row| {
                    row.get(0)
                })?;
            Ok((*table, count))
        })
        .collect()
}
