//! # tdm-commons
//!
//! Shared building blocks for the TDM backend:
//! - **Ids**: newtype identifiers (`ProjectId`, `EnvironmentId`, `SystemId`,
//!   `TableName`, `RowId`) plus the process-wide `RowIdGenerator`
//! - **Models**: the generic `Row`/`Value` representation used by every
//!   dynamic table, and the `TestDataType` row partition
//! - **Constants**: injected system column names and the canonical
//!   timestamp render format
//! - **Errors**: a small dependency-free error shared across crates

pub mod constants;
pub mod errors;
pub mod ids;
pub mod models;

pub use errors::{CommonError, Result};
pub use ids::{EnvironmentId, ProjectId, RowId, RowIdGenerator, SystemId, TableName};
pub use models::row::Row;
pub use models::test_data_type::TestDataType;
pub use models::value::Value;
