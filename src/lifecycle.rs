//! Service lifecycle: wiring the stores, catalog and orchestrator.
//!
//! Standalone mode binds every seam to its in-process implementation: the
//! in-memory backend, the catalog registry and the in-process lock
//! manager. Deployments replace these with database-backed ones at the
//! same seams.

use crate::config::AppConfig;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tdm_catalog::{
    Catalog, CatalogRegistry, ColumnRegistry, ConfigStore, EnvironmentInfo, RefreshConfig,
    StaticEnvironmentProvider,
};
use tdm_commons::{RowId, RowIdGenerator, TableName};
use tdm_jobs::{
    BulkAction, BulkActionConfig, BulkActionOrchestrator, BulkActionResult, ExternalQueryRunner,
    InProcessLockManager, JobError, LoggingProgressSink, TableSelector,
};
use tdm_store::{DynamicTableStore, InMemoryBackend};

/// Runner used when no source system is configured; every refresh fails
/// with a clear message instead of silently emptying tables.
struct UnconfiguredQueryRunner;

#[async_trait]
impl ExternalQueryRunner for UnconfiguredQueryRunner {
    async fn fetch(
        &self,
        _environment: &EnvironmentInfo,
        _config: &RefreshConfig,
    ) -> tdm_jobs::Result<Vec<tdm_commons::Row>> {
        Err(JobError::External(
            "no external query runner configured".to_string(),
        ))
    }
}

/// Aggregated application components shared across the service.
pub struct AppContext {
    pub store: DynamicTableStore,
    pub catalog: Arc<CatalogRegistry>,
    pub configs: Arc<ConfigStore>,
    pub columns: Arc<ColumnRegistry>,
    pub orchestrator: BulkActionOrchestrator,
    stale_after_days: u32,
}

impl AppContext {
    /// Occupy rows for a consumer and record the usage on the catalog
    /// entry. A table without an entry is still occupied; only the usage
    /// stamp is skipped.
    pub async fn occupy_rows(
        &self,
        table: &TableName,
        occupied_by: &str,
        ids: &[RowId],
    ) -> tdm_jobs::Result<u64> {
        let affected = self.store.occupy(table, occupied_by, ids).await?;
        if let Err(e) = self.catalog.touch(table, Utc::now()).await {
            log::debug!("usage stamp skipped for {}: {}", table, e);
        }
        Ok(affected)
    }

    /// Release previously occupied rows.
    pub async fn release_rows(&self, table: &TableName, ids: &[RowId]) -> tdm_jobs::Result<u64> {
        Ok(self.store.release(table, ids).await?)
    }

    /// Drop every table unused for longer than the configured stale window.
    pub async fn sweep_stale_tables(&self) -> tdm_jobs::Result<Vec<BulkActionResult>> {
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(self.stale_after_days));
        self.orchestrator
            .run(BulkActionConfig::new(
                BulkAction::Drop,
                TableSelector::LastUsedBefore { cutoff },
            ))
            .await
    }
}

/// Build the application components from configuration.
pub fn bootstrap(config: &AppConfig) -> Result<AppContext> {
    let backend = Arc::new(InMemoryBackend::new());
    let store = DynamicTableStore::new(backend)
        .with_row_ids(Arc::new(RowIdGenerator::new(config.service.worker_id)))
        .with_timeout(Duration::from_secs(config.service.statement_timeout_secs));

    let catalog = Arc::new(CatalogRegistry::new());
    let configs = Arc::new(ConfigStore::new());
    let columns = Arc::new(ColumnRegistry::new());
    let environments = Arc::new(StaticEnvironmentProvider::new());

    let orchestrator = BulkActionOrchestrator::new(
        catalog.clone(),
        store.clone(),
        configs.clone(),
        environments,
        columns.clone(),
        Arc::new(UnconfiguredQueryRunner),
    )
    .with_locks(Arc::new(InProcessLockManager::new()))
    .with_lock_timeout(Duration::from_secs(config.jobs.lock_timeout_secs))
    .with_progress(Arc::new(LoggingProgressSink));

    info!(
        "application context initialized (worker_id={}, stale_after={}d)",
        config.service.worker_id, config.jobs.stale_after_days
    );

    Ok(AppContext {
        store,
        catalog,
        configs,
        columns,
        orchestrator,
        stale_after_days: config.jobs.stale_after_days,
    })
}

/// Run until a termination signal arrives.
pub async fn run(context: AppContext) -> Result<()> {
    info!("service ready, waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    drop(context);
    Ok(())
}
