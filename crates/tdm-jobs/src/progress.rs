//! Progress streaming for long bulk runs.

use crate::results::BulkActionResult;
use tokio::sync::mpsc;

/// One progress notification of a bulk run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The run resolved `total` tables and is starting.
    Started { total: usize },
    /// One table finished; `index` is its catalog resolution position.
    TableFinished {
        index: usize,
        total: usize,
        result: BulkActionResult,
    },
    /// The selector matched no tables; the run ends without results.
    NothingFound,
    /// Every table finished.
    Finished { total: usize, failed: usize },
}

/// Consumer of progress events.
///
/// Publishing must never fail the run; implementations swallow their own
/// transport errors.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

/// Sink discarding every event.
#[derive(Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn publish(&self, _event: ProgressEvent) {}
}

/// Sink writing events to the log.
#[derive(Default)]
pub struct LoggingProgressSink;

impl ProgressSink for LoggingProgressSink {
    fn publish(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::Started { total } => {
                log::info!("bulk run started over {} tables", total)
            }
            ProgressEvent::TableFinished {
                index,
                total,
                result,
            } => log::info!(
                "table {}/{} finished: {} ({})",
                index + 1,
                total,
                result.table_name,
                if result.is_failed() { "failed" } else { "ok" }
            ),
            ProgressEvent::NothingFound => log::info!("bulk run matched no tables"),
            ProgressEvent::Finished { total, failed } => {
                log::info!("bulk run finished: {} tables, {} failed", total, failed)
            }
        }
    }
}

/// Sink forwarding events over an unbounded channel, e.g. to a websocket
/// fan-out. A dropped receiver only drops further events.
pub struct ChannelProgressSink {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn publish(&self, event: ProgressEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("progress receiver gone, event dropped");
        }
    }
}
