//! SQLite persistence layer.
//!
//! RULE: Only the store executes SQL.
//! Components call store methods — they never touch the connection directly.
//!
//! `LedgerStore` owns the connection. Row-level operations live on the
//! borrowed `Db` view, which works both standalone (`store.db()`) and inside
//! a write transaction (`store.begin_immediate()?.db()`), so the recorder can
//! re-run its checks within the same transaction boundary as the insert.

use crate::{
    error::LedgerResult,
    event::EventLogEntry,
    types::{AgencyId, UserId},
};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

mod client;
mod contract;
mod stats;
mod transaction;

pub use client::{ClientRow, NewClient};
pub use contract::{ContractRow, NewContract};
pub use transaction::{NewTransaction, RecordedRow};

pub struct LedgerStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl LedgerStore {
    pub fn open(path: &str) -> LedgerResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        // Contending writers wait instead of failing with SQLITE_BUSY.
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> LedgerResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> LedgerResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_clients.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_contracts.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_transactions.sql"))?;
        Ok(())
    }

    /// Row-level access outside any explicit transaction.
    pub fn db(&self) -> Db<'_> {
        Db { conn: &self.conn }
    }

    /// Start a write transaction (BEGIN IMMEDIATE — takes the write lock up
    /// front). Dropping the returned guard without `commit` rolls back.
    pub fn begin_immediate(&self) -> LedgerResult<WriteTxn<'_>> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        Ok(WriteTxn { tx })
    }
}

/// Borrowed view over the connection. All row-level SQL hangs off this.
#[derive(Clone, Copy)]
pub struct Db<'c> {
    conn: &'c Connection,
}

pub struct WriteTxn<'c> {
    tx: Transaction<'c>,
}

impl WriteTxn<'_> {
    pub fn db(&self) -> Db<'_> {
        // Transaction derefs to Connection.
        Db { conn: &self.tx }
    }

    pub fn commit(self) -> LedgerResult<()> {
        self.tx.commit().map_err(Into::into)
    }
}

/// Mapper failure for a CHECK-constrained column holding an unexpected value.
pub(crate) fn bad_enum(idx: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("unrecognized enum value '{value}'").into(),
    )
}

// ── Agency ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AgencyRow {
    pub agency_id: AgencyId,
    pub code: String,
    pub name: String,
    pub city: Option<String>,
    pub active: bool,
}

// ── User ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UserRow {
    pub user_id: UserId,
    pub username: String,
    pub role: String,
    pub agency_id: Option<AgencyId>,
    pub active: bool,
}

impl Db<'_> {
    pub fn insert_agency(
        &self,
        code: &str,
        name: &str,
        city: Option<&str>,
        active: bool,
    ) -> LedgerResult<AgencyId> {
        self.conn.execute(
            "INSERT INTO agency (code, name, city, active) VALUES (?1, ?2, ?3, ?4)",
            params![code, name, city, active as i64],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn agency(&self, agency_id: AgencyId) -> LedgerResult<Option<AgencyRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT agency_id, code, name, city, active FROM agency WHERE agency_id = ?1",
                params![agency_id],
                |row| {
                    Ok(AgencyRow {
                        agency_id: row.get(0)?,
                        code: row.get(1)?,
                        name: row.get(2)?,
                        city: row.get(3)?,
                        active: row.get::<_, i64>(4)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn insert_user(
        &self,
        username: &str,
        role: &str,
        agency_id: Option<AgencyId>,
        active: bool,
    ) -> LedgerResult<UserId> {
        self.conn.execute(
            "INSERT INTO app_user (username, role, agency_id, active) VALUES (?1, ?2, ?3, ?4)",
            params![username, role, agency_id, active as i64],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn user(&self, user_id: UserId) -> LedgerResult<Option<UserRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, username, role, agency_id, active
                 FROM app_user WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserRow {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        role: row.get(2)?,
                        agency_id: row.get(3)?,
                        active: row.get::<_, i64>(4)? != 0,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    // ── Reference sequence ─────────────────────────────────

    /// Claim the next reference sequence number. Must be called inside a
    /// write transaction; the read and the bump are then a single atomic
    /// step with the eventual insert.
    pub fn next_reference_sequence(&self) -> LedgerResult<i64> {
        let next: i64 = self.conn.query_row(
            "SELECT next_value + 1 FROM reference_sequence WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "UPDATE reference_sequence SET next_value = ?1 WHERE id = 1",
            params![next],
        )?;
        Ok(next)
    }

    // ── Event log ──────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> LedgerResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (component, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.component,
                entry.event_type,
                entry.payload,
                entry.created_at
            ],
        )?;
        Ok(())
    }

    pub fn events_of_type(&self, event_type: &str) -> LedgerResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, component, event_type, payload, created_at
             FROM event_log WHERE event_type = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![event_type], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    component: row.get(1)?,
                    event_type: row.get(2)?,
                    payload: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
