use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;

/// Search backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Base URL of the search backend.
    #[serde(default = "default_url")]
    pub url: String,

    /// Index name pattern holding private messages.
    #[serde(default = "default_index_pattern")]
    pub index_pattern: String,

    /// How long the backend keeps a scroll context alive between pages.
    #[serde(default = "default_scroll_keep_alive")]
    pub scroll_keep_alive: String,

    /// Number of hits fetched per scroll page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout for the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index_pattern: default_index_pattern(),
            scroll_keep_alive: default_scroll_keep_alive(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.url)
            .map_err(|e| ConfigError::Validation(format!("Invalid search.url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "search.url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.index_pattern.is_empty() {
            return Err(ConfigError::Validation(
                "search.index_pattern must not be empty".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Validation(
                "search.page_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index_pattern() -> String {
    "private-*".to_string()
}

fn default_scroll_keep_alive() -> String {
    "1m".to_string()
}

fn default_page_size() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}
