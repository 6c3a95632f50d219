// ABOUTME: Server-knowledge cursor store - one watermark per incremental endpoint
// ABOUTME: Loaded once per run and advanced inside the run's transaction after each merge

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

/// Incremental endpoints that carry a server-knowledge cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Categories,
    Months,
    Accounts,
    Transactions,
    Payees,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Categories,
        Endpoint::Months,
        Endpoint::Accounts,
        Endpoint::Transactions,
        Endpoint::Payees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Categories => "categories",
            Endpoint::Months => "months",
            Endpoint::Accounts => "accounts",
            Endpoint::Transactions => "transactions",
            Endpoint::Payees => "payees",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Endpoint::ALL.into_iter().find(|e| e.as_str() == value)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of every endpoint's watermark for the duration of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursors {
    values: HashMap<Endpoint, i64>,
}

impl Cursors {
    /// Watermark for `endpoint`; 0 (full fetch) when never recorded.
    pub fn get(&self, endpoint: Endpoint) -> i64 {
        self.values.get(&endpoint).copied().unwrap_or(0)
    }

    fn set(&mut self, endpoint: Endpoint, value: i64) {
        self.values.insert(endpoint, value);
    }
}

/// One persisted cursor row, as shown by `status`.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorEntry {
    pub endpoint: String,
    pub value: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reads and writes the `server_knowledge` table through the caller's connection.
///
/// Pass the open `rusqlite::Transaction` of the current run: `advance` is a
/// plain write and only becomes durable when that transaction commits.
pub struct CursorStore<'a> {
    conn: &'a Connection,
}

impl<'a> CursorStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load the watermark of every known endpoint.
    pub fn load(&self) -> Result<Cursors> {
        let mut stmt = self
            .conn
            .prepare("SELECT endpoint, value FROM server_knowledge")?;
        let mut rows = stmt.query([])?;

        let mut cursors = Cursors::default();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let value: i64 = row.get(1)?;
            match Endpoint::parse(&name) {
                Some(endpoint) => cursors.set(endpoint, value),
                None => tracing::debug!("Ignoring unknown cursor endpoint '{}'", name),
            }
        }
        Ok(cursors)
    }

    /// Persist a new watermark for `endpoint` and record it in `cursors`.
    pub fn advance(&self, cursors: &mut Cursors, endpoint: Endpoint, value: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO server_knowledge(endpoint, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(endpoint) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![endpoint.as_str(), value, Utc::now()],
        )?;
        cursors.set(endpoint, value);
        Ok(())
    }

    /// Every persisted cursor row, ordered by endpoint name.
    pub fn entries(&self) -> Result<Vec<CursorEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT endpoint, value, updated_at FROM server_knowledge ORDER BY endpoint",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(CursorEntry {
                    endpoint: row.get(0)?,
                    value: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}
