//! The single SQLite connection the mapper runs statements on.
//!
//! Statements are plain text produced by the mapper; the connector only
//! executes them. Each statement commits on its own.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::Value as RawValue;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::value::SqlValue;

/// Where and how to open the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub path: String,
    /// How long a statement waits on a locked database file.
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

impl ConnectorConfig {
    pub const IN_MEMORY: &'static str = ":memory:";

    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Self::IN_MEMORY)
    }

    pub fn with_busy_timeout(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = Some(millis);
        self
    }

    fn open(&self) -> Result<Connection> {
        let conn = if self.path == Self::IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(&self.path)?
        };
        if let Some(millis) = self.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(millis))?;
        }
        // Constraints name the implicit rowid, which the engine refuses as an
        // enforced parent key. The bundled build enables enforcement by default.
        conn.pragma_update(None, "foreign_keys", false)?;
        Ok(conn)
    }
}

/// One result row, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Materialized outcome of one statement.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    rows: VecDeque<Row>,
    last_insert_rowid: i64,
    changes: usize,
}

impl Cursor {
    pub fn fetch_one(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    pub fn fetch_all(self) -> Vec<Row> {
        self.rows.into()
    }

    /// Row id assigned by the most recent successful insert on the connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.last_insert_rowid
    }

    /// Rows modified by this statement; zero for queries.
    pub fn changes(&self) -> usize {
        self.changes
    }
}

/// Holder of the process connection. At most one is open at a time.
#[derive(Debug, Default)]
pub struct Connector {
    conn: Mutex<Option<Connection>>,
}

impl Connector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, config: &ConnectorConfig) -> Result<()> {
        let mut slot = self.lock()?;
        if slot.is_some() {
            return Err(Error::AlreadyConnected);
        }
        *slot = Some(config.open()?);
        info!(path = %config.path, "connected");
        Ok(())
    }

    pub fn disconnect(&self) -> Result<()> {
        let mut slot = self.lock()?;
        let conn = slot.take().ok_or(Error::NotConnected)?;
        if let Err((conn, err)) = conn.close() {
            *slot = Some(conn);
            return Err(err.into());
        }
        info!("disconnected");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Locks the connection for a sequence of statements.
    pub(crate) fn session(&self) -> Result<Session<'_>> {
        let guard = self.lock()?;
        if guard.is_none() {
            return Err(Error::NotConnected);
        }
        Ok(Session { guard })
    }

    pub fn execute(&self, sql: &str) -> Result<Cursor> {
        self.session()?.execute(sql)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }
}

/// Exclusive use of the open connection until dropped.
pub(crate) struct Session<'c> {
    guard: MutexGuard<'c, Option<Connection>>,
}

impl Session<'_> {
    pub(crate) fn execute(&self, sql: &str) -> Result<Cursor> {
        let conn = self.guard.as_ref().ok_or(Error::NotConnected)?;
        debug!(sql = %sql, "execute");

        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut cursor = Cursor::default();

        if column_count == 0 {
            cursor.changes = stmt.execute([])?;
        } else {
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(SqlValue::from(row.get::<_, RawValue>(i)?));
                }
                cursor.rows.push_back(Row::new(values));
            }
        }
        cursor.last_insert_rowid = conn.last_insert_rowid();
        Ok(cursor)
    }
}
