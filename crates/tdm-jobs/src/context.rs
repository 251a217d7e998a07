//! Trace context threaded through spawned table workers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TRACE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Correlation snapshot for one bulk run.
///
/// Spawned workers lose the caller's logging scope, so the context is
/// captured once per run and cloned into every task; log lines carry its
/// id so a run's output can be stitched back together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    initiator: Option<String>,
}

impl TraceContext {
    /// Capture a fresh context with a unique run id.
    pub fn capture(initiator: Option<String>) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let seq = TRACE_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            trace_id: format!("{:x}-{:x}", millis, seq),
            initiator,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn initiator(&self) -> Option<&str> {
        self.initiator.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_ids_are_unique() {
        let a = TraceContext::capture(None);
        let b = TraceContext::capture(Some("scheduler".to_string()));
        assert_ne!(a.trace_id(), b.trace_id());
        assert_eq!(b.initiator(), Some("scheduler"));
    }
}
