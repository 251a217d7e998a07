//! Link refresh: re-render link column metadata.

use crate::config::BulkAction;
use crate::error::Result;
use crate::executors::executor_trait::{BulkActionExecutor, JobContext};
use crate::results::{ActionOutcome, LinkStats};
use async_trait::async_trait;
use tdm_catalog::{CatalogEntry, ColumnKind};
use tdm_commons::TestDataType;

/// Walks every link-kind column descriptor of the table and re-renders its
/// targets from the current cell values.
///
/// Reads only; runs without the per-table lock so it can proceed while a
/// data action holds the table.
pub struct RefreshLinksExecutor;

#[async_trait]
impl BulkActionExecutor for RefreshLinksExecutor {
    fn action(&self) -> BulkAction {
        BulkAction::RefreshLinks
    }

    fn requires_lock(&self) -> bool {
        false
    }

    async fn execute(&self, entry: &CatalogEntry, ctx: &JobContext) -> Result<ActionOutcome> {
        let descriptors: Vec<_> = ctx
            .columns
            .for_table(&entry.table_name)
            .into_iter()
            .filter(|d| d.kind == ColumnKind::Link)
            .collect();
        if descriptors.is_empty() {
            return Ok(ActionOutcome::LinksRefreshed(LinkStats::default()));
        }

        let read = ctx
            .store
            .get_rows(&entry.table_name, TestDataType::All, &[], None, None, None)
            .await?;
        let mut links = 0u64;
        for descriptor in &descriptors {
            for row in &read.rows {
                if let Some(raw) = row.get(&descriptor.key.column).and_then(|v| v.render()) {
                    links += descriptor.render_links(&raw).len() as u64;
                }
            }
        }

        Ok(ActionOutcome::LinksRefreshed(LinkStats {
            columns: descriptors.len() as u64,
            links,
        }))
    }
}
