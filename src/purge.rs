//! The purge workflow: fetch, confirm, delete, invalidate.
//!
//! Strictly sequential. There is deliberately no compensating transaction:
//! if cache invalidation fails after a successful delete, the index and
//! cache are left inconsistent and the error is surfaced as-is.

use thiserror::Error;

use crate::{
    cache::{self, CacheError, HistoryCache},
    config::{ConfigError, DeleteConfig, PurgeConfig},
    fetch::{self, FetchOutcome},
    search::{ConversationFilter, DeleteDescriptor, SearchClient, SearchError},
};

#[derive(Debug, Error)]
pub enum PurgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Terminal state of one purge run.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The filter matched nothing; no backend was mutated.
    NothingToDelete,
    /// The operator declined confirmation; no backend was mutated.
    Aborted,
    Completed {
        deleted: usize,
        cache_keys_cleared: usize,
    },
}

/// Run the full workflow.
///
/// `confirm` is the interactive gate, consulted only when `interactive` is
/// set and something was fetched; `cache` of `None` skips invalidation.
pub async fn run(
    search: &SearchClient,
    cache: Option<&dyn HistoryCache>,
    config: &PurgeConfig,
    filter: &ConversationFilter,
    interactive: bool,
    confirm: impl FnOnce(&FetchOutcome) -> bool,
) -> Result<Outcome, PurgeError> {
    let outcome = fetch::fetch_messages(search, &config.search, filter, interactive).await?;

    if outcome.is_empty() {
        println!("No messages to delete.");
        return Ok(Outcome::NothingToDelete);
    }

    if interactive && !confirm(&outcome) {
        println!("Exiting without deleting anything.");
        return Ok(Outcome::Aborted);
    }

    tracing::warn!(count = outcome.descriptors.len(), "deleting messages");
    let deleted = delete_messages(search, &config.delete, &outcome.descriptors).await?;

    let cache_keys_cleared = match cache {
        Some(cache) => {
            cache::invalidate_conversations(
                cache,
                &config.cache.key_prefix,
                &outcome.conversation_ids,
            )
            .await?
        }
        None => 0,
    };

    Ok(Outcome::Completed {
        deleted,
        cache_keys_cleared,
    })
}

/// Submit the collected descriptors as bulk delete request(s).
///
/// Item-level failures inside a bulk response are logged at debug only;
/// the backend's result object is the sole record of them.
async fn delete_messages(
    search: &SearchClient,
    config: &DeleteConfig,
    descriptors: &[DeleteDescriptor],
) -> Result<usize, SearchError> {
    let chunk_size = config
        .batch_size
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(descriptors.len());

    for chunk in descriptors.chunks(chunk_size.max(1)) {
        let result = search.bulk_delete(chunk).await?;
        tracing::debug!(
            took_ms = result.took,
            errors = result.errors,
            failed = result.failed(),
            submitted = chunk.len(),
            "bulk delete result"
        );
    }

    Ok(descriptors.len())
}
