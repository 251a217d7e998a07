//! Pluggable SQL execution backend.
//!
//! The store never talks to a database driver directly; it renders
//! statements/queries from `tdm-sql` and hands them to a `SqlBackend`.
//! Implementations must be thread-safe (`Send + Sync`) and honor the
//! caller-supplied timeout: a timed-out call must release its underlying
//! connection and return [`StoreError::Timeout`], never hang.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tdm_commons::{Row, TableName};
use tdm_sql::{SelectQuery, Statement};

/// A lazy, finite, one-shot (non-restartable) sequence of rows.
pub struct Cursor {
    inner: Box<dyn Iterator<Item = Row> + Send>,
}

impl Cursor {
    pub fn new(inner: impl Iterator<Item = Row> + Send + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(rows.into_iter())
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").finish_non_exhaustive()
    }
}

impl Iterator for Cursor {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.inner.next()
    }
}

/// Execution seam between the table store and a concrete database.
///
/// `timeout` is per call; `None` means the backend default applies.
#[async_trait]
pub trait SqlBackend: Send + Sync {
    /// Execute a mutating statement, returning the number of affected rows.
    async fn execute(&self, statement: &Statement, timeout: Option<Duration>) -> Result<u64>;

    /// Run the data query and return its cursor.
    async fn select(&self, query: &SelectQuery, timeout: Option<Duration>) -> Result<Cursor>;

    /// Run the COUNT(*) twin of a query.
    async fn count(&self, query: &SelectQuery, timeout: Option<Duration>) -> Result<u64>;

    /// Live column list from schema introspection.
    ///
    /// This is deliberately not served from descriptor metadata: physical
    /// columns may lag descriptors, and the live schema wins.
    async fn columns(&self, table: &TableName) -> Result<Vec<String>>;

    /// Whether the physical table currently exists.
    async fn table_exists(&self, table: &TableName) -> Result<bool>;
}
