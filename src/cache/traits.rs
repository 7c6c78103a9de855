use async_trait::async_trait;

use super::error::CacheResult;

/// Backend holding cached conversation history.
///
/// Only deletion is needed here; the seam exists so the purge workflow can
/// be exercised without a live Redis.
#[async_trait]
pub trait HistoryCache: Send + Sync {
    /// Delete all listed keys in one call.
    async fn delete_keys(&self, keys: &[String]) -> CacheResult<()>;
}
