use async_trait::async_trait;

use super::{error::CacheResult, traits::HistoryCache};
use crate::config::CacheConfig;

pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    /// Lazy client: no connection is made until the first command, so a
    /// purge that finds nothing to delete never touches Redis.
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        Ok(Self {
            client: redis::Client::open(config.url.as_str())?,
        })
    }
}

#[async_trait]
impl HistoryCache for RedisCache {
    async fn delete_keys(&self, keys: &[String]) -> CacheResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("DEL").arg(keys).query_async(&mut conn).await?;
        Ok(())
    }
}
