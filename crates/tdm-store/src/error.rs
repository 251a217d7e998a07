//! Error types for the dynamic table store.

use tdm_commons::TableName;
use tdm_sql::SqlError;
use thiserror::Error;

/// Errors raised by the table store and its backends.
///
/// Every variant that concerns a physical table carries the table name so
/// bulk-action results stay table-scoped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(TableName),

    #[error("No data to insert into table {0}")]
    NoDataToInsert(TableName),

    #[error("Failed to add column '{column}' to table {table}: {reason}")]
    ColumnAdd {
        table: TableName,
        column: String,
        reason: String,
    },

    #[error("Query against table {table} timed out after {millis} ms")]
    Timeout { table: TableName, millis: u64 },

    #[error("SQL build error: {0}")]
    Sql(#[from] SqlError),

    #[error("Backend error on table {table}: {message}")]
    Backend { table: TableName, message: String },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
