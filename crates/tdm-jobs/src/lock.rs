//! Per-table locks serializing bulk actions.
//!
//! Two concurrent runs touching the same table must not interleave their
//! truncate/insert sequences. The lock key is the table name; acquisition
//! is bounded by a timeout so a stuck run cannot wedge every later one.

use crate::error::{JobError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held lock; dropping it releases the key.
#[derive(Debug)]
pub struct LockGuard {
    _guard: OwnedMutexGuard<()>,
}

/// Acquisition seam for per-key locks.
///
/// Deployments with several backend instances bind this to a distributed
/// lock; [`InProcessLockManager`] covers a single instance and tests.
#[async_trait]
pub trait LockManager: Send + Sync {
    /// Acquire the lock for `key`, waiting at most `timeout`.
    async fn acquire(&self, key: &str, timeout: Duration) -> Result<LockGuard>;
}

/// Process-local lock manager keyed by string.
///
/// Mutexes are created on first use and never removed; the key space is
/// bounded by the set of live tables.
#[derive(Default)]
pub struct InProcessLockManager {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl InProcessLockManager {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockManager for InProcessLockManager {
    async fn acquire(&self, key: &str, timeout: Duration) -> Result<LockGuard> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        match tokio::time::timeout(timeout, mutex.lock_owned()).await {
            Ok(guard) => Ok(LockGuard { _guard: guard }),
            Err(_) => Err(JobError::LockTimeout {
                key: key.to_string(),
                millis: timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_acquire_times_out_while_held() {
        let manager = InProcessLockManager::new();
        let held = manager
            .acquire("tdm_orders", Duration::from_millis(50))
            .await
            .unwrap();

        let err = manager
            .acquire("tdm_orders", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::LockTimeout { .. }));

        drop(held);
        manager
            .acquire("tdm_orders", Duration::from_millis(20))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_contend() {
        let manager = InProcessLockManager::new();
        let _a = manager
            .acquire("tdm_a", Duration::from_millis(20))
            .await
            .unwrap();
        let _b = manager
            .acquire("tdm_b", Duration::from_millis(20))
            .await
            .unwrap();
    }
}
