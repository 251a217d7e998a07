//! The bulk action orchestrator: resolve, lock, execute, report.

use crate::config::{BulkAction, BulkActionConfig, TableSelector};
use crate::context::TraceContext;
use crate::error::Result;
use crate::executors::{
    BulkActionExecutor, CleanupExecutor, DropTablesExecutor, JobContext, RefreshExecutor,
    RefreshLinksExecutor,
};
use crate::external::ExternalQueryRunner;
use crate::lock::{InProcessLockManager, LockGuard, LockManager};
use crate::notify::{NoopNotifier, ResultNotifier};
use crate::progress::{NoopProgressSink, ProgressEvent, ProgressSink};
use crate::results::{ActionOutcome, BulkActionResult};
use std::sync::Arc;
use std::time::Duration;
use tdm_catalog::{Catalog, CatalogEntry, ColumnRegistry, ConfigStore, EnvironmentProvider};
use tdm_store::DynamicTableStore;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one bulk action over every table a selector resolves.
///
/// Failure isolation: a failing table becomes a failed result in its
/// resolution slot, the remaining tables still run, and the call returns
/// `Ok` with every result. Only selector resolution failures propagate as
/// `Err`.
pub struct BulkActionOrchestrator {
    catalog: Arc<dyn Catalog>,
    store: DynamicTableStore,
    configs: Arc<ConfigStore>,
    environments: Arc<dyn EnvironmentProvider>,
    columns: Arc<ColumnRegistry>,
    query_runner: Arc<dyn ExternalQueryRunner>,
    locks: Arc<dyn LockManager>,
    notifier: Arc<dyn ResultNotifier>,
    sink: Arc<dyn ProgressSink>,
    lock_timeout: Duration,
}

impl BulkActionOrchestrator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: DynamicTableStore,
        configs: Arc<ConfigStore>,
        environments: Arc<dyn EnvironmentProvider>,
        columns: Arc<ColumnRegistry>,
        query_runner: Arc<dyn ExternalQueryRunner>,
    ) -> Self {
        Self {
            catalog,
            store,
            configs,
            environments,
            columns,
            query_runner,
            locks: Arc::new(InProcessLockManager::new()),
            notifier: Arc::new(NoopNotifier),
            sink: Arc::new(NoopProgressSink),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_locks(mut self, locks: Arc<dyn LockManager>) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ResultNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Run `request` to completion and return per-table results in catalog
    /// resolution order.
    pub async fn run(&self, request: BulkActionConfig) -> Result<Vec<BulkActionResult>> {
        let mut entries = self.resolve(&request.selector).await?;
        if request.action == BulkAction::Cleanup {
            entries.retain(|e| self.cleanup_applies(e));
        }
        if entries.is_empty() {
            self.sink.publish(ProgressEvent::NothingFound);
            return Ok(Vec::new());
        }

        let total = entries.len();
        let trace = TraceContext::capture(None);
        log::info!(
            "[{}] bulk {} over {} tables (parallel={})",
            trace.trace_id(),
            request.action.as_str(),
            total,
            request.parallel
        );
        self.sink.publish(ProgressEvent::Started { total });

        let executor = executor_for(request.action);
        let ctx = JobContext {
            store: self.store.clone(),
            catalog: self.catalog.clone(),
            configs: self.configs.clone(),
            environments: self.environments.clone(),
            columns: self.columns.clone(),
            query_runner: self.query_runner.clone(),
            save_occupied: request.save_occupied,
            trace,
        };

        let results = if request.parallel {
            self.run_parallel(executor, &entries, &ctx, total).await
        } else {
            self.run_sequential(executor, &entries, &ctx, total).await
        };

        let failed = results.iter().filter(|r| r.is_failed()).count();
        self.sink.publish(ProgressEvent::Finished { total, failed });
        if request.send_result && !request.recipients.is_empty() {
            self.notifier.notify(&request.recipients, &results).await;
        }
        Ok(results)
    }

    async fn run_sequential(
        &self,
        executor: Arc<dyn BulkActionExecutor>,
        entries: &[CatalogEntry],
        ctx: &JobContext,
        total: usize,
    ) -> Vec<BulkActionResult> {
        let mut results = Vec::with_capacity(total);
        for (index, entry) in entries.iter().enumerate() {
            results.push(
                process_table(
                    executor.clone(),
                    entry.clone(),
                    ctx.clone(),
                    self.locks.clone(),
                    self.lock_timeout,
                    self.sink.clone(),
                    index,
                    total,
                )
                .await,
            );
        }
        results
    }

    async fn run_parallel(
        &self,
        executor: Arc<dyn BulkActionExecutor>,
        entries: &[CatalogEntry],
        ctx: &JobContext,
        total: usize,
    ) -> Vec<BulkActionResult> {
        let handles: Vec<_> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                tokio::spawn(process_table(
                    executor.clone(),
                    entry.clone(),
                    ctx.clone(),
                    self.locks.clone(),
                    self.lock_timeout,
                    self.sink.clone(),
                    index,
                    total,
                ))
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    let entry = &entries[index];
                    log::error!(
                        "[{}] worker for table {} aborted: {}",
                        ctx.trace.trace_id(),
                        entry.table_name,
                        e
                    );
                    results.push(BulkActionResult {
                        title: entry.title.clone(),
                        table_name: entry.table_name.clone(),
                        environment: entry.environment_id.to_string(),
                        outcome: ActionOutcome::failed(format!("worker aborted: {}", e)),
                    });
                }
            }
        }
        results
    }

    async fn resolve(&self, selector: &TableSelector) -> Result<Vec<CatalogEntry>> {
        let entries = match selector {
            TableSelector::ProjectSystem { project, system } => {
                self.catalog.by_project_and_system(project, system).await?
            }
            TableSelector::ProjectTitle { project, title } => {
                self.catalog.by_project_and_title(project, title).await?
            }
            TableSelector::LastUsedBefore { cutoff } => {
                self.catalog.last_used_before(*cutoff).await?
            }
        };
        Ok(entries)
    }

    fn cleanup_applies(&self, entry: &CatalogEntry) -> bool {
        entry
            .cleanup_config_id
            .as_deref()
            .and_then(|id| self.configs.cleanup(id))
            .map(|config| config.enabled)
            .unwrap_or(false)
    }
}

fn executor_for(action: BulkAction) -> Arc<dyn BulkActionExecutor> {
    match action {
        BulkAction::Refresh => Arc::new(RefreshExecutor),
        BulkAction::Cleanup => Arc::new(CleanupExecutor),
        BulkAction::Drop => Arc::new(DropTablesExecutor),
        BulkAction::RefreshLinks => Arc::new(RefreshLinksExecutor),
    }
}

/// The unit of work for one table: lock, execute, report.
///
/// Never fails; every failure path collapses into a failed outcome so the
/// caller always receives one result per resolved table.
#[allow(clippy::too_many_arguments)]
async fn process_table(
    executor: Arc<dyn BulkActionExecutor>,
    entry: CatalogEntry,
    ctx: JobContext,
    locks: Arc<dyn LockManager>,
    lock_timeout: Duration,
    sink: Arc<dyn ProgressSink>,
    index: usize,
    total: usize,
) -> BulkActionResult {
    let guard: Result<Option<LockGuard>> = if executor.requires_lock() {
        locks
            .acquire(entry.table_name.as_str(), lock_timeout)
            .await
            .map(Some)
    } else {
        Ok(None)
    };

    let outcome = match guard {
        Err(e) => {
            log::warn!(
                "[{}] table {} skipped: {}",
                ctx.trace.trace_id(),
                entry.table_name,
                e
            );
            ActionOutcome::failed(e.to_string())
        }
        Ok(_guard) => match executor.execute(&entry, &ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!(
                    "[{}] {} failed for table {}: {}",
                    ctx.trace.trace_id(),
                    executor.action().as_str(),
                    entry.table_name,
                    e
                );
                ActionOutcome::failed(e.to_string())
            }
        },
    };

    let environment = match ctx.environments.environment(&entry.environment_id).await {
        Ok(info) => info.name,
        Err(_) => entry.environment_id.to_string(),
    };
    let result = BulkActionResult {
        title: entry.title,
        table_name: entry.table_name,
        environment,
        outcome,
    };
    sink.publish(ProgressEvent::TableFinished {
        index,
        total,
        result: result.clone(),
    });
    result
}
