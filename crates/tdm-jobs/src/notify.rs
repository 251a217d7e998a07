//! Result notification after a bulk run.

use crate::results::BulkActionResult;
use async_trait::async_trait;

/// Delivery seam for run summaries.
///
/// Called only when the request asked for notification and the run
/// produced at least one result; a matched-nothing run sends nothing.
/// Delivery failures are logged by implementations and never fail the run.
#[async_trait]
pub trait ResultNotifier: Send + Sync {
    async fn notify(&self, recipients: &[String], results: &[BulkActionResult]);
}

/// Notifier discarding every summary.
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl ResultNotifier for NoopNotifier {
    async fn notify(&self, _recipients: &[String], _results: &[BulkActionResult]) {}
}

/// Notifier writing the summary to the log, for standalone mode.
#[derive(Default)]
pub struct LoggingNotifier;

#[async_trait]
impl ResultNotifier for LoggingNotifier {
    async fn notify(&self, recipients: &[String], results: &[BulkActionResult]) {
        let failed = results.iter().filter(|r| r.is_failed()).count();
        log::info!(
            "notifying {:?}: {} tables processed, {} failed",
            recipients,
            results.len(),
            failed
        );
    }
}
