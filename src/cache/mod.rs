//! Invalidation of cached conversation history.
//!
//! The platform keeps each private chat's recent history in Redis under
//! `{prefix}{chat_id}`. Deleting messages from the index makes those
//! entries stale, so they are dropped after a successful purge.

mod error;
mod keys;
mod redis;
mod traits;

use std::collections::BTreeSet;

pub use error::{CacheError, CacheResult};
pub use keys::history_key;
pub use redis::RedisCache;
pub use traits::HistoryCache;

/// Drop the cached history of every affected conversation.
///
/// Issues a single batched delete; a no-op when no conversations were
/// touched. Returns the number of keys requested for deletion.
pub async fn invalidate_conversations(
    cache: &dyn HistoryCache,
    key_prefix: &str,
    conversation_ids: &BTreeSet<String>,
) -> CacheResult<usize> {
    if conversation_ids.is_empty() {
        return Ok(0);
    }

    let keys: Vec<String> = conversation_ids
        .iter()
        .map(|chat_id| history_key(key_prefix, chat_id))
        .collect();

    tracing::debug!(?keys, "clearing stale history cache entries");
    cache.delete_keys(&keys).await?;

    Ok(keys.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingCache {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl HistoryCache for RecordingCache {
        async fn delete_keys(&self, keys: &[String]) -> CacheResult<()> {
            self.calls.lock().unwrap().push(keys.to_vec());
            Ok(())
        }
    }

    #[tokio::test]
    async fn one_key_per_distinct_conversation() {
        let cache = RecordingCache::default();
        let ids: BTreeSet<String> = ["7-13", "7-13-archived"]
            .into_iter()
            .map(String::from)
            .collect();

        let cleared = invalidate_conversations(&cache, "history:pchat:", &ids)
            .await
            .unwrap();

        assert_eq!(cleared, 2);
        let calls = cache.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            ["history:pchat:7-13", "history:pchat:7-13-archived"]
        );
    }

    #[tokio::test]
    async fn empty_set_issues_no_delete() {
        let cache = RecordingCache::default();

        let cleared = invalidate_conversations(&cache, "history:pchat:", &BTreeSet::new())
            .await
            .unwrap();

        assert_eq!(cleared, 0);
        assert!(cache.calls.lock().unwrap().is_empty());
    }
}
