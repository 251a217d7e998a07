//! Refresh: replace table content from its external source.

use crate::config::BulkAction;
use crate::error::{JobError, Result};
use crate::executors::executor_trait::{BulkActionExecutor, JobContext};
use crate::results::{ActionOutcome, RefreshStats};
use async_trait::async_trait;
use tdm_catalog::CatalogEntry;
use tdm_commons::TestDataType;

/// Fetches fresh rows through the external query runner, clears the stale
/// content and inserts the fetched batch.
///
/// With `save_occupied` only the available partition is cleared; rows a
/// consumer currently holds survive the refresh untouched. A source that
/// returns zero rows still clears, leaving the table empty (or
/// occupied-only).
pub struct RefreshExecutor;

#[async_trait]
impl BulkActionExecutor for RefreshExecutor {
    fn action(&self) -> BulkAction {
        BulkAction::Refresh
    }

    async fn execute(&self, entry: &CatalogEntry, ctx: &JobContext) -> Result<ActionOutcome> {
        let config_id =
            entry
                .refresh_config_id
                .as_deref()
                .ok_or_else(|| JobError::ConfigNotAssigned {
                    table: entry.table_name.to_string(),
                    kind: "refresh",
                })?;
        let config = ctx
            .configs
            .refresh(config_id)
            .ok_or_else(|| JobError::MissingConfig {
                kind: "refresh",
                id: config_id.to_string(),
            })?;
        let environment = ctx.environments.environment(&entry.environment_id).await?;

        let rows = ctx.query_runner.fetch(&environment, &config).await?;
        log::debug!(
            "[{}] fetched {} rows for table {}",
            ctx.trace.trace_id(),
            rows.len(),
            entry.table_name
        );

        let preserved = if ctx.save_occupied {
            let count = ctx
                .store
                .count_rows(&entry.table_name, TestDataType::Occupied)
                .await?;
            ctx.store
                .delete_partition(&entry.table_name, TestDataType::Available)
                .await?;
            count
        } else {
            ctx.store.truncate_table(&entry.table_name).await?;
            0
        };

        let inserted = if rows.is_empty() {
            0
        } else {
            ctx.store
                .insert_rows(&entry.table_name, true, &rows, false)
                .await?
        };

        Ok(ActionOutcome::Refreshed(RefreshStats {
            fetched: rows.len() as u64,
            inserted,
            preserved,
        }))
    }
}
