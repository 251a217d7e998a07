//! The executor seam: one implementation per bulk action.

use crate::config::BulkAction;
use crate::context::TraceContext;
use crate::error::Result;
use crate::external::ExternalQueryRunner;
use crate::results::ActionOutcome;
use async_trait::async_trait;
use std::sync::Arc;
use tdm_catalog::{Catalog, CatalogEntry, ColumnRegistry, ConfigStore, EnvironmentProvider};
use tdm_store::DynamicTableStore;

/// Shared dependencies of one bulk run.
#[derive(Clone)]
pub struct JobContext {
    pub store: DynamicTableStore,
    pub catalog: Arc<dyn Catalog>,
    pub configs: Arc<ConfigStore>,
    pub environments: Arc<dyn EnvironmentProvider>,
    pub columns: Arc<ColumnRegistry>,
    pub query_runner: Arc<dyn ExternalQueryRunner>,
    pub save_occupied: bool,
    pub trace: TraceContext,
}

/// One bulk action applied to one table.
///
/// Executors are stateless; everything table- or run-specific arrives
/// through the entry and the context. An `Err` from [`execute`] is
/// captured by the orchestrator as that table's failed result and never
/// aborts the run.
///
/// [`execute`]: BulkActionExecutor::execute
#[async_trait]
pub trait BulkActionExecutor: Send + Sync {
    fn action(&self) -> BulkAction;

    /// Whether the per-table lock must be held during [`execute`].
    ///
    /// Metadata-only actions opt out and run even while a data action
    /// holds the table.
    ///
    /// [`execute`]: BulkActionExecutor::execute
    fn requires_lock(&self) -> bool {
        true
    }

    async fn execute(&self, entry: &CatalogEntry, ctx: &JobContext) -> Result<ActionOutcome>;
}
