//! Bulk action executors, one per [`BulkAction`](crate::config::BulkAction).

pub mod cleanup;
pub mod drop_tables;
pub mod executor_trait;
pub mod links;
pub mod refresh;

pub use cleanup::CleanupExecutor;
pub use drop_tables::DropTablesExecutor;
pub use executor_trait::{BulkActionExecutor, JobContext};
pub use links::RefreshLinksExecutor;
pub use refresh::RefreshExecutor;
