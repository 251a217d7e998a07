//! End-to-end bulk runs over the in-memory backend and catalog registry.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tdm_catalog::{
    Catalog, CatalogEntry, CatalogRegistry, CleanupConfig, ColumnDescriptor, ColumnKey,
    ColumnRegistry, ConfigStore, EnvironmentInfo, RefreshConfig, StaticEnvironmentProvider,
};
use tdm_commons::{EnvironmentId, ProjectId, Row, SystemId, TableName, TestDataType, Value};
use tdm_jobs::{
    ActionOutcome, BulkAction, BulkActionConfig, BulkActionOrchestrator, ExternalQueryRunner,
    InProcessLockManager, JobError, LockManager, ProgressEvent, ProgressSink, ResultNotifier,
    TableSelector,
};
use tdm_store::{DynamicTableStore, InMemoryBackend};

/// Runner serving scripted rows (or a scripted failure) per refresh config.
#[derive(Default)]
struct ScriptedRunner {
    rows: DashMap<String, Vec<Row>>,
    failures: DashMap<String, String>,
}

impl ScriptedRunner {
    fn serve(&self, config_id: &str, rows: Vec<Row>) {
        self.rows.insert(config_id.to_string(), rows);
    }

    fn fail(&self, config_id: &str, message: &str) {
        self.failures
            .insert(config_id.to_string(), message.to_string());
    }
}

#[async_trait]
impl ExternalQueryRunner for ScriptedRunner {
    async fn fetch(
        &self,
        _environment: &EnvironmentInfo,
        config: &RefreshConfig,
    ) -> tdm_jobs::Result<Vec<Row>> {
        if let Some(message) = self.failures.get(&config.id) {
            return Err(JobError::External(message.clone()));
        }
        Ok(self
            .rows
            .get(&config.id)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressSink for RecordingSink {
    fn publish(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<(Vec<String>, usize)>>,
}

#[async_trait]
impl ResultNotifier for RecordingNotifier {
    async fn notify(&self, recipients: &[String], results: &[tdm_jobs::BulkActionResult]) {
        self.calls
            .lock()
            .unwrap()
            .push((recipients.to_vec(), results.len()));
    }
}

struct Fixture {
    store: DynamicTableStore,
    catalog: Arc<CatalogRegistry>,
    configs: Arc<ConfigStore>,
    columns: Arc<ColumnRegistry>,
    runner: Arc<ScriptedRunner>,
    sink: Arc<RecordingSink>,
    notifier: Arc<RecordingNotifier>,
    locks: Arc<InProcessLockManager>,
    orchestrator: BulkActionOrchestrator,
}

fn fixture() -> Fixture {
    let store = DynamicTableStore::new(Arc::new(InMemoryBackend::new()));
    let catalog = Arc::new(CatalogRegistry::new());
    let configs = Arc::new(ConfigStore::new());
    let columns = Arc::new(ColumnRegistry::new());
    let runner = Arc::new(ScriptedRunner::default());
    let sink = Arc::new(RecordingSink::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let locks = Arc::new(InProcessLockManager::new());

    let environments = Arc::new(StaticEnvironmentProvider::new());
    environments.insert(EnvironmentInfo {
        id: EnvironmentId::new("env-1"),
        name: "QA".to_string(),
        connection: "db://qa".to_string(),
    });

    let orchestrator = BulkActionOrchestrator::new(
        catalog.clone(),
        store.clone(),
        configs.clone(),
        environments,
        columns.clone(),
        runner.clone(),
    )
    .with_locks(locks.clone())
    .with_lock_timeout(Duration::from_millis(50))
    .with_notifier(notifier.clone())
    .with_progress(sink.clone());

    Fixture {
        store,
        catalog,
        configs,
        columns,
        runner,
        sink,
        notifier,
        locks,
        orchestrator,
    }
}

fn entry(table: &str, title: &str) -> CatalogEntry {
    CatalogEntry::new(
        TableName::new(table),
        ProjectId::new("p1"),
        EnvironmentId::new("env-1"),
        SystemId::new("billing"),
        title,
    )
}

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::text(*v)))
        .collect()
}

fn billing_selector() -> TableSelector {
    TableSelector::ProjectSystem {
        project: ProjectId::new("p1"),
        system: SystemId::new("billing"),
    }
}

async fn seed_refresh_table(f: &Fixture, table: &str, title: &str, config_id: &str) {
    f.catalog
        .upsert(entry(table, title).with_refresh_config(config_id))
        .await
        .unwrap();
    f.configs.upsert_refresh(RefreshConfig {
        id: config_id.to_string(),
        query: "SELECT * FROM src".to_string(),
        timeout_secs: 60,
    });
    f.store.create_if_absent(&TableName::new(table)).await.unwrap();
}

#[tokio::test]
async fn test_one_failing_table_does_not_abort_the_run() {
    let f = fixture();
    seed_refresh_table(&f, "tdm_a", "A", "r-a").await;
    seed_refresh_table(&f, "tdm_b", "B", "r-b").await;
    seed_refresh_table(&f, "tdm_c", "C", "r-c").await;
    f.runner.serve("r-a", vec![row(&[("name", "a1")])]);
    f.runner.fail("r-b", "source unreachable");
    f.runner
        .serve("r-c", vec![row(&[("name", "c1")]), row(&[("name", "c2")])]);

    let results = f
        .orchestrator
        .run(BulkActionConfig::new(BulkAction::Refresh, billing_selector()))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert!(!results[0].is_failed());
    assert!(results[1].is_failed());
    assert!(!results[2].is_failed());
    assert_eq!(results[0].environment, "QA");

    match &results[2].outcome {
        ActionOutcome::Refreshed(stats) => {
            assert_eq!(stats.fetched, 2);
            assert_eq!(stats.inserted, 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    // The failed table kept its old (empty) content.
    assert_eq!(
        f.store
            .count_rows(&TableName::new("tdm_b"), TestDataType::All)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_parallel_run_reports_in_resolution_order() {
    let f = fixture();
    seed_refresh_table(&f, "tdm_a", "A", "r-a").await;
    seed_refresh_table(&f, "tdm_b", "B", "r-b").await;
    f.runner.serve("r-a", vec![row(&[("name", "a1")])]);
    f.runner.serve("r-b", vec![row(&[("name", "b1")])]);

    let results = f
        .orchestrator
        .run(BulkActionConfig::new(BulkAction::Refresh, billing_selector()).parallel())
        .await
        .unwrap();

    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert!(results.iter().all(|r| !r.is_failed()));
}

#[tokio::test]
async fn test_empty_selection_emits_nothing_found_and_sends_no_mail() {
    let f = fixture();
    let results = f
        .orchestrator
        .run(
            BulkActionConfig::new(BulkAction::Refresh, billing_selector())
                .notify(vec!["team@example.com".to_string()]),
        )
        .await
        .unwrap();

    assert!(results.is_empty());
    let events = f.sink.events.lock().unwrap();
    assert_eq!(events.as_slice(), &[ProgressEvent::NothingFound]);
    assert!(f.notifier.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_progress_event_sequence_for_sequential_run() {
    let f = fixture();
    seed_refresh_table(&f, "tdm_a", "A", "r-a").await;
    f.runner.serve("r-a", vec![row(&[("name", "a1")])]);

    f.orchestrator
        .run(
            BulkActionConfig::new(BulkAction::Refresh, billing_selector())
                .notify(vec!["team@example.com".to_string()]),
        )
        .await
        .unwrap();

    let events = f.sink.events.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], ProgressEvent::Started { total: 1 });
    assert!(matches!(
        events[1],
        ProgressEvent::TableFinished { index: 0, total: 1, .. }
    ));
    assert_eq!(events[2], ProgressEvent::Finished { total: 1, failed: 0 });

    let calls = f.notifier.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, vec!["team@example.com".to_string()]);
    assert_eq!(calls[0].1, 1);
}

#[tokio::test]
async fn test_cleanup_removes_expired_rows_only() {
    let f = fixture();
    f.catalog
        .upsert(entry("tdm_a", "A").with_cleanup_config("weekly"))
        .await
        .unwrap();
    f.configs.upsert_cleanup(CleanupConfig {
        id: "weekly".to_string(),
        enabled: true,
        column: "valid_until".to_string(),
        retention_days: 7,
    });
    let table = TableName::new("tdm_a");
    f.store.create_if_absent(&table).await.unwrap();
    f.store
        .insert_rows(
            &table,
            true,
            &[
                row(&[("valid_until", "2020-01-01 00:00:00")]),
                row(&[("valid_until", "2020-06-01 00:00:00")]),
                row(&[("valid_until", "2099-01-01 00:00:00")]),
            ],
            false,
        )
        .await
        .unwrap();

    let results = f
        .orchestrator
        .run(BulkActionConfig::new(BulkAction::Cleanup, billing_selector()))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    match &results[0].outcome {
        ActionOutcome::Cleaned(stats) => {
            assert_eq!(stats.total, 3);
            assert_eq!(stats.removed, 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(f.store.count_rows(&table, TestDataType::All).await.unwrap(), 1);
}

#[tokio::test]
async fn test_cleanup_skips_tables_without_enabled_config() {
    let f = fixture();
    f.catalog.upsert(entry("tdm_plain", "Plain")).await.unwrap();
    f.catalog
        .upsert(entry("tdm_off", "Off").with_cleanup_config("disabled"))
        .await
        .unwrap();
    f.configs.upsert_cleanup(CleanupConfig {
        id: "disabled".to_string(),
        enabled: false,
        column: "valid_until".to_string(),
        retention_days: 7,
    });

    let results = f
        .orchestrator
        .run(BulkActionConfig::new(BulkAction::Cleanup, billing_selector()))
        .await
        .unwrap();
    assert!(results.is_empty());
    assert_eq!(
        f.sink.events.lock().unwrap().as_slice(),
        &[ProgressEvent::NothingFound]
    );
}

#[tokio::test]
async fn test_drop_removes_table_descriptors_and_entry() {
    let f = fixture();
    f.catalog.upsert(entry("tdm_a", "A")).await.unwrap();
    let table = TableName::new("tdm_a");
    f.store.create_if_absent(&table).await.unwrap();
    f.columns
        .upsert(ColumnDescriptor::link(
            ColumnKey::new(table.clone(), "ticket"),
            "https://issues.example/{value}",
            false,
        ))
        .unwrap();

    let results = f
        .orchestrator
        .run(BulkActionConfig::new(BulkAction::Drop, billing_selector()))
        .await
        .unwrap();

    assert_eq!(results[0].outcome, ActionOutcome::Dropped);
    assert!(!f.store.table_exists(&table).await.unwrap());
    assert!(f.columns.for_table(&table).is_empty());
    assert!(f.catalog.get(&table).await.is_err());

    // Re-running the drop over a refreshed selection finds nothing.
    let rerun = f
        .orchestrator
        .run(BulkActionConfig::new(BulkAction::Drop, billing_selector()))
        .await
        .unwrap();
    assert!(rerun.is_empty());
}

#[tokio::test]
async fn test_save_occupied_refresh_preserves_held_rows() {
    let f = fixture();
    seed_refresh_table(&f, "tdm_a", "A", "r-a").await;
    let table = TableName::new("tdm_a");
    f.store
        .insert_rows(&table, true, &[row(&[("name", "held")])], false)
        .await
        .unwrap();
    let read = f
        .store
        .get_rows(&table, TestDataType::All, &[], None, None, None)
        .await
        .unwrap();
    let id = tdm_commons::RowId::new(
        read.rows[0]
            .get(tdm_commons::constants::ROW_ID)
            .unwrap()
            .render()
            .unwrap(),
    );
    f.store.occupy(&table, "ci-run", &[id]).await.unwrap();

    f.runner.serve("r-a", vec![row(&[("name", "fresh")])]);
    let results = f
        .orchestrator
        .run(
            BulkActionConfig::new(BulkAction::Refresh, billing_selector()).save_occupied(),
        )
        .await
        .unwrap();

    match &results[0].outcome {
        ActionOutcome::Refreshed(stats) => {
            assert_eq!(stats.preserved, 1);
            assert_eq!(stats.inserted, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(
        f.store.count_rows(&table, TestDataType::Occupied).await.unwrap(),
        1
    );
    assert_eq!(
        f.store.count_rows(&table, TestDataType::Available).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_held_lock_fails_only_the_locked_table() {
    let f = fixture();
    seed_refresh_table(&f, "tdm_a", "A", "r-a").await;
    seed_refresh_table(&f, "tdm_b", "B", "r-b").await;
    f.runner.serve("r-a", vec![row(&[("name", "a1")])]);
    f.runner.serve("r-b", vec![row(&[("name", "b1")])]);

    let _held = f
        .locks
        .acquire("tdm_b", Duration::from_millis(10))
        .await
        .unwrap();
    let results = f
        .orchestrator
        .run(BulkActionConfig::new(BulkAction::Refresh, billing_selector()))
        .await
        .unwrap();

    assert!(!results[0].is_failed());
    assert!(results[1].is_failed());
    match &results[1].outcome {
        ActionOutcome::Failed { message } => assert!(message.contains("lock")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_link_refresh_runs_without_the_table_lock() {
    let f = fixture();
    f.catalog.upsert(entry("tdm_a", "A")).await.unwrap();
    let table = TableName::new("tdm_a");
    f.store.create_if_absent(&table).await.unwrap();
    f.store
        .insert_rows(&table, true, &[row(&[("ticket", "TDM-1, TDM-2")])], false)
        .await
        .unwrap();
    f.columns
        .upsert(ColumnDescriptor::link(
            ColumnKey::new(table.clone(), "ticket"),
            "https://issues.example/{value}",
            true,
        ))
        .unwrap();

    // A data action holds the table; the metadata pass proceeds anyway.
    let _held = f
        .locks
        .acquire("tdm_a", Duration::from_millis(10))
        .await
        .unwrap();
    let results = f
        .orchestrator
        .run(BulkActionConfig::new(
            BulkAction::RefreshLinks,
            billing_selector(),
        ))
        .await
        .unwrap();

    match &results[0].outcome {
        ActionOutcome::LinksRefreshed(stats) => {
            assert_eq!(stats.columns, 1);
            assert_eq!(stats.links, 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
