//! Connection lifecycle and scoped sessions.
//!
//! A [`Store`] owns the single SQLite connection for one process. It is
//! opened once at startup, passed by reference to the services, and closed
//! at exit. Each service call works inside a [`Session`], a transaction that
//! commits explicitly and rolls back when dropped on any other path.
//!
//! # Example
//!
//! ```no_run
//! use construction_sqlite::Store;
//!
//! let store = Store::open("construction.db").unwrap();
//! store.init().unwrap();
//!
//! let status = store.status().unwrap();
//! println!("Projects: {}", status.projects);
//!
//! store.close().unwrap();
//! ```

use std::ops::Deref;
use std::path::Path;

use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::schema::{TABLES, generate_schema_sql};

/// Handle to the local relational store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (or creates) the database file at `path`.
    ///
    /// Foreign key enforcement is switched on for the connection. Tables are
    /// not created until [`init`](Self::init) is called.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening store");
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Creates all tables and indexes that do not exist yet.
    ///
    /// Safe to call on every invocation. Executes within a transaction.
    pub fn init(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(generate_schema_sql())
            .map_err(|e| StoreError::MigrationError(format!("failed to create tables: {e}")))?;
        tx.commit()?;
        Ok(())
    }

    /// Starts a scoped session for one logical operation.
    pub fn session(&self) -> Result<Session<'_>> {
        Ok(Session {
            tx: self.conn.unchecked_transaction()?,
        })
    }

    /// Returns whether the tables exist and how many rows each holds.
    pub fn status(&self) -> Result<StoreStatus> {
        if !self.tables_exist()? {
            return Ok(StoreStatus::default());
        }

        let mut counts = [0i64; TABLES.len()];
        for (count, table) in counts.iter_mut().zip(TABLES) {
            *count = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        }
        let [projects, phases, milestones, suppliers, materials, inventory, orders] = counts;

        Ok(StoreStatus {
            tables_exist: true,
            projects,
            phases,
            milestones,
            suppliers,
            materials,
            inventory,
            orders,
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| StoreError::from(e))
    }

    fn tables_exist(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='projects'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// One logical unit of work against the store.
///
/// Dereferences to the underlying [`Connection`]. Work is persisted only by
/// [`commit`](Self::commit); dropping the session without committing rolls
/// every statement back.
pub struct Session<'a> {
    tx: Transaction<'a>,
}

impl Session<'_> {
    /// Persists everything done in this session.
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

impl Deref for Session<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}

/// Snapshot of table presence and row counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    /// Whether the schema tables exist in the database.
    pub tables_exist: bool,
    pub projects: i64,
    pub phases: i64,
    pub milestones: i64,
    pub suppliers: i64,
    pub materials: i64,
    pub inventory: i64,
    pub orders: i64,
}
