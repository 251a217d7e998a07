//! # tdm-sql
//!
//! SQL generation for tables whose schema is only known at runtime.
//!
//! The crate is built around a small statement model rather than raw string
//! concatenation: filters become a [`Predicate`] tree, reads become a
//! [`SelectQuery`] (which always carries its COUNT(*) twin), and writes
//! become [`Statement`] values. Every node renders to SQL through
//! `to_sql()`, and backends that do not speak SQL (the in-memory one)
//! interpret the same tree structurally instead of re-parsing text.
//!
//! ## Safety
//!
//! - Every identifier is double-quoted ([`identifiers::quote_ident`])
//! - Every literal has embedded `'` doubled ([`identifiers::escape_literal`]);
//!   this is the only injection defense for filter values and is applied in
//!   exactly one place
//! - Filter operator semantics live in one place, the condition factory
//!   ([`conditions::condition`])

pub mod conditions;
pub mod error;
pub mod filters;
pub mod identifiers;
pub mod query;
pub mod statements;

pub use conditions::{condition, Condition, ConditionKind};
pub use error::SqlError;
pub use filters::{Filter, Predicate, SortDirection, SortOrder};
pub use query::{build_select, Page, SelectQuery};
pub use statements::{system_column_defs, ColumnDef, ColumnType, Statement};

/// Result type alias for SQL building.
pub type Result<T> = std::result::Result<T, SqlError>;
