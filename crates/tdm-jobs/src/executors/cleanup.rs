//! Cleanup: remove rows older than the retention window.

use crate::config::BulkAction;
use crate::error::{JobError, Result};
use crate::executors::executor_trait::{BulkActionExecutor, JobContext};
use crate::results::{ActionOutcome, CleanupStats};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tdm_catalog::CatalogEntry;
use tdm_commons::TestDataType;

/// Deletes rows whose configured timestamp column is older than the
/// cleanup config's retention window.
///
/// The orchestrator only schedules tables whose config is enabled; a
/// disabled config reached here (e.g. flipped mid-run) removes nothing.
/// With `save_occupied` the deletion spares occupied rows regardless of
/// age.
pub struct CleanupExecutor;

#[async_trait]
impl BulkActionExecutor for CleanupExecutor {
    fn action(&self) -> BulkAction {
        BulkAction::Cleanup
    }

    async fn execute(&self, entry: &CatalogEntry, ctx: &JobContext) -> Result<ActionOutcome> {
        let config_id =
            entry
                .cleanup_config_id
                .as_deref()
                .ok_or_else(|| JobError::ConfigNotAssigned {
                    table: entry.table_name.to_string(),
                    kind: "cleanup",
                })?;
        let config = ctx
            .configs
            .cleanup(config_id)
            .ok_or_else(|| JobError::MissingConfig {
                kind: "cleanup",
                id: config_id.to_string(),
            })?;

        let total = ctx
            .store
            .count_rows(&entry.table_name, TestDataType::All)
            .await?;
        if !config.enabled {
            log::debug!(
                "[{}] cleanup config '{}' disabled, table {} untouched",
                ctx.trace.trace_id(),
                config.id,
                entry.table_name
            );
            return Ok(ActionOutcome::Cleaned(CleanupStats { total, removed: 0 }));
        }

        let cutoff = Utc::now() - Duration::days(i64::from(config.retention_days));
        let data_type = if ctx.save_occupied {
            TestDataType::Available
        } else {
            TestDataType::All
        };
        let removed = ctx
            .store
            .delete_rows_before(&entry.table_name, data_type, &config.column, cutoff)
            .await?;

        Ok(ActionOutcome::Cleaned(CleanupStats { total, removed }))
    }
}
