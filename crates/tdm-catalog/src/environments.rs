//! Environment metadata: where a dynamic table physically lives.

use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tdm_commons::EnvironmentId;

/// Connection metadata of one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub id: EnvironmentId,
    pub name: String,
    /// Backend connection string; opaque to this crate.
    pub connection: String,
}

/// Source of environment metadata.
///
/// Deployments resolve environments from a central service; lookups are
/// expected to be cached in front of this trait.
#[async_trait]
pub trait EnvironmentProvider: Send + Sync {
    async fn environment(&self, id: &EnvironmentId) -> Result<EnvironmentInfo>;
}

/// Fixed environment set, for tests and standalone mode.
#[derive(Default)]
pub struct StaticEnvironmentProvider {
    environments: DashMap<EnvironmentId, EnvironmentInfo>,
}

impl StaticEnvironmentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, info: EnvironmentInfo) {
        self.environments.insert(info.id.clone(), info);
    }
}

#[async_trait]
impl EnvironmentProvider for StaticEnvironmentProvider {
    async fn environment(&self, id: &EnvironmentId) -> Result<EnvironmentInfo> {
        self.environments
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| CatalogError::EnvironmentNotFound(id.to_string()))
    }
}

/// Caching layer over an [`EnvironmentProvider`].
///
/// Environments change rarely; the cache holds every resolved environment
/// until [`CachedEnvironmentProvider::reset`] drops the whole set (e.g.
/// after an environment is re-pointed at a different database).
pub struct CachedEnvironmentProvider {
    inner: Arc<dyn EnvironmentProvider>,
    cache: DashMap<EnvironmentId, EnvironmentInfo>,
}

impl CachedEnvironmentProvider {
    pub fn new(inner: Arc<dyn EnvironmentProvider>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Drop all cached environments. The next lookup hits the inner
    /// provider again.
    pub fn reset(&self) {
        self.cache.clear();
        log::info!("environment cache reset");
    }
}

#[async_trait]
impl EnvironmentProvider for CachedEnvironmentProvider {
    async fn environment(&self, id: &EnvironmentId) -> Result<EnvironmentInfo> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(cached.value().clone());
        }
        let info = self.inner.environment(id).await?;
        self.cache.insert(id.clone(), info.clone());
        Ok(info)
    }
}
