//! Configuration for the purge tool.
//!
//! Everything is defaulted so the tool runs against a local backend with no
//! config file at all. A TOML file can override any section, with support
//! for environment variable interpolation using `${VAR_NAME}` syntax:
//!
//! ```toml
//! [search]
//! url = "http://es01.internal:9200"
//!
//! [cache]
//! url = "redis://:${REDIS_PASSWORD}@cache01.internal:6379"
//! ```

mod cache;
mod search;

use std::path::Path;

pub use cache::*;
pub use search::*;
use serde::{Deserialize, Serialize};

/// Root configuration. All sections are optional with sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PurgeConfig {
    /// Search backend holding the message index.
    #[serde(default)]
    pub search: SearchConfig,

    /// Bulk deletion behavior.
    #[serde(default)]
    pub delete: DeleteConfig,

    /// History cache to invalidate after deletion.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl PurgeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: PurgeConfig = toml::from_str(&expanded)?;
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

/// Bulk deletion settings.
///
/// By default the entire result set is submitted as one bulk call, keeping
/// the all-or-nothing intent of a single maintenance pass. Setting
/// `batch_size` trades that for bounded request sizes: a crash mid-run can
/// then leave a partially deleted conversation behind.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DeleteConfig {
    /// Maximum number of documents per bulk delete request.
    /// Unset means a single request carrying the full result set.
    #[serde(default)]
    pub batch_size: Option<std::num::NonZeroUsize>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand `${VAR_NAME}` references against the process environment.
///
/// References inside TOML comments are left alone, so a commented-out
/// line never fails the load over an unset variable.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');

        let mut last_end = 0;
        for cap in re.captures_iter(line) {
            let matched = cap.get(0).expect("whole match");

            // Skip references at or past the comment marker
            if let Some(pos) = comment_pos
                && matched.start() >= pos
            {
                continue;
            }

            let name = &cap[1];
            let value = std::env::var(name)
                .map_err(|_| ConfigError::EnvVarNotFound(name.to_string()))?;

            result.push_str(&line[last_end..matched.start()]);
            result.push_str(&value);
            last_end = matched.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    Ok(result)
}
