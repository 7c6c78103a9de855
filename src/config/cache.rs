use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;

/// History cache configuration.
///
/// The platform caches recent conversation history per private chat; those
/// entries go stale the moment their messages are deleted from the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Redis connection URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Fixed prefix prepended to a private chat id to form its history key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.url)
            .map_err(|e| ConfigError::Validation(format!("Invalid cache.url: {e}")))?;
        if !matches!(url.scheme(), "redis" | "rediss") {
            return Err(ConfigError::Validation(format!(
                "cache.url must use redis or rediss, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }
}

fn default_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "history:pchat:".to_string()
}
