//! External data sources feeding table refreshes.

use crate::error::Result;
use async_trait::async_trait;
use tdm_catalog::{EnvironmentInfo, RefreshConfig};
use tdm_commons::Row;

/// Runner of a refresh config's query against its source system.
///
/// The query text and connection string are opaque here; implementations
/// bind them to an actual driver. Returned rows carry user columns only,
/// system columns are injected on insert.
#[async_trait]
pub trait ExternalQueryRunner: Send + Sync {
    async fn fetch(&self, environment: &EnvironmentInfo, config: &RefreshConfig)
        -> Result<Vec<Row>>;
}
