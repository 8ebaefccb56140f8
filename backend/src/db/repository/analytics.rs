//! Analytics repository trait for collection-wide metal statistics.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::services::MetalSummary;

/// Repository trait for analytics operations.
///
/// Implementations may push the aggregation down to the store (the Postgres
/// backend uses a single `AVG/MIN/MAX` query) or compute it in memory.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Per-metal average, minimum and maximum over every stored reading.
    ///
    /// # Returns
    /// * `Ok(MetalSummary)` - All-zero summary when nothing is stored
    /// * `Err(RepositoryError)` - If the query fails
    async fn fetch_metal_summary(&self) -> RepositoryResult<MetalSummary>;
}
