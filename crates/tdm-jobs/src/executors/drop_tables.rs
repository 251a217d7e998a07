//! Drop: remove the physical table and every trace of it in the catalog.

use crate::config::BulkAction;
use crate::error::Result;
use crate::executors::executor_trait::{BulkActionExecutor, JobContext};
use crate::results::ActionOutcome;
use async_trait::async_trait;
use tdm_catalog::CatalogEntry;

/// Drops the physical table, its column descriptors and its catalog entry.
///
/// The physical drop is best-effort so a table already gone (a crashed
/// earlier run) does not block the metadata teardown; re-running a drop is
/// therefore safe.
pub struct DropTablesExecutor;

#[async_trait]
impl BulkActionExecutor for DropTablesExecutor {
    fn action(&self) -> BulkAction {
        BulkAction::Drop
    }

    async fn execute(&self, entry: &CatalogEntry, ctx: &JobContext) -> Result<ActionOutcome> {
        ctx.store.drop_table_if_exists(&entry.table_name).await?;
        ctx.columns.remove_table(&entry.table_name);
        ctx.catalog.remove(&entry.table_name).await?;
        log::info!(
            "[{}] dropped table {} and its metadata",
            ctx.trace.trace_id(),
            entry.table_name
        );
        Ok(ActionOutcome::Dropped)
    }
}
