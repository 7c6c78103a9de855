//! Scrolls the message index and collects what the later steps consume:
//! one deletion descriptor per matched document and the set of private
//! chat ids whose cached history will go stale.

use std::collections::BTreeSet;

use crate::{
    config::SearchConfig,
    report::MessageSummary,
    search::{ConversationFilter, DeleteDescriptor, SearchClient, SearchResult, query},
};

/// Everything one fetch pass produced. Returned by value so the fetch step
/// stays free of process-wide mutable state.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// One descriptor per matched document, in scroll order.
    pub descriptors: Vec<DeleteDescriptor>,
    /// Distinct private chat ids observed across all matched documents.
    pub conversation_ids: BTreeSet<String>,
}

impl FetchOutcome {
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Fetch all private messages matching `filter`.
///
/// When `interactive` is set, one summary line per message is printed to
/// stdout so the operator can review the result set before confirming.
pub async fn fetch_messages(
    client: &SearchClient,
    config: &SearchConfig,
    filter: &ConversationFilter,
    interactive: bool,
) -> SearchResult<FetchOutcome> {
    let query = filter.to_query();
    tracing::info!(query = %query, "searching for private messages");

    let mut scroll = client
        .open_scroll(
            &config.index_pattern,
            &config.scroll_keep_alive,
            config.page_size,
            &query,
        )
        .await?;

    let mut outcome = FetchOutcome::default();
    while let Some(page) = scroll.next_page().await? {
        for hit in page {
            tracing::debug!(?hit, "matched message document");

            outcome.descriptors.push(DeleteDescriptor::from_hit(&hit));

            // A document can reference more than one private chat id value.
            for chat_id in hit.field_values(query::FIELD_CHAT_ID) {
                outcome.conversation_ids.insert(chat_id);
            }

            if interactive {
                println!("{}", MessageSummary::from_hit(&hit, filter.include_content()));
            }
        }
    }

    tracing::debug!(
        affected = ?outcome.conversation_ids,
        "affected private chat ids"
    );
    tracing::debug!(
        count = outcome.descriptors.len(),
        "documents marked for deletion"
    );

    Ok(outcome)
}
