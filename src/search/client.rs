//! Thin HTTP client for the search backend.
//!
//! Only the three calls this tool needs: opening and paging a scrolled
//! search, and submitting an NDJSON bulk delete. Deletion goes through the
//! bulk API rather than delete-by-query; the latter is deprecated in the
//! backend version this tool targets.

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::{
    error::{SearchError, SearchResult},
    types::{DeleteDescriptor, Hit, ScrollResponse},
};
use crate::config::SearchConfig;

pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    pub fn from_config(config: &SearchConfig) -> SearchResult<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_secs))
                .build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Open a scrolled search over `indices` and return the cursor.
    ///
    /// The returned [`Scroll`] is a lazy, finite sequence of hit pages. It
    /// is consumed by value and cannot be restarted; a fresh scroll must be
    /// opened for another pass.
    pub async fn open_scroll(
        &self,
        indices: &str,
        keep_alive: &str,
        page_size: u32,
        query: &Value,
    ) -> SearchResult<Scroll<'_>> {
        let url = format!("{}/{}/_search", self.base_url, indices);
        let page_size = page_size.to_string();
        let response = self
            .http
            .post(&url)
            .query(&[("scroll", keep_alive), ("size", page_size.as_str())])
            .json(query)
            .send()
            .await?;
        let first: ScrollResponse = check(response).await?.json().await?;

        // Without a scroll id there is no way to page past the first hits;
        // treating that as success would silently truncate the result set.
        if first.scroll_id.is_none() && !first.hits.hits.is_empty() {
            return Err(SearchError::InvalidResponse(
                "scrolled search returned hits but no scroll id".into(),
            ));
        }

        Ok(Scroll {
            client: self,
            keep_alive: keep_alive.to_string(),
            scroll_id: first.scroll_id,
            pending: Some(first.hits.hits),
        })
    }

    async fn continue_scroll(
        &self,
        keep_alive: &str,
        scroll_id: &str,
    ) -> SearchResult<ScrollResponse> {
        let url = format!("{}/_search/scroll", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "scroll": keep_alive,
                "scroll_id": scroll_id,
            }))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Release a scroll context on the backend. Best-effort: the backend
    /// expires contexts on its own once `keep_alive` lapses.
    async fn clear_scroll(&self, scroll_id: &str) {
        let url = format!("{}/_search/scroll", self.base_url);
        let result = self
            .http
            .delete(&url)
            .json(&serde_json::json!({ "scroll_id": [scroll_id] }))
            .send()
            .await;

        if let Err(e) = result {
            tracing::debug!(error = %e, "failed to clear scroll context");
        }
    }

    /// Submit one bulk request deleting every listed document.
    pub async fn bulk_delete(
        &self,
        descriptors: &[DeleteDescriptor],
    ) -> SearchResult<super::BulkResponse> {
        let mut body = String::new();
        for descriptor in descriptors {
            body.push_str(&descriptor.bulk_action().to_string());
            body.push('\n');
        }

        let url = format!("{}/_bulk", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Map non-2xx responses to a backend error carrying the response body.
async fn check(response: reqwest::Response) -> SearchResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Backend { status, body })
}

/// Cursor over a scrolled search, yielding pages of hits until exhausted.
pub struct Scroll<'a> {
    client: &'a SearchClient,
    keep_alive: String,
    scroll_id: Option<String>,
    pending: Option<Vec<Hit>>,
}

impl Scroll<'_> {
    /// The next non-empty page, or `None` once the scroll is exhausted.
    ///
    /// Exhaustion releases the backend scroll context; further calls keep
    /// returning `None`.
    pub async fn next_page(&mut self) -> SearchResult<Option<Vec<Hit>>> {
        if let Some(page) = self.pending.take() {
            if !page.is_empty() {
                return Ok(Some(page));
            }
            self.finish().await;
            return Ok(None);
        }

        let Some(scroll_id) = self.scroll_id.clone() else {
            return Ok(None);
        };

        let response = self
            .client
            .continue_scroll(&self.keep_alive, &scroll_id)
            .await?;
        // The backend may rotate the scroll id between pages.
        if let Some(next_id) = response.scroll_id {
            self.scroll_id = Some(next_id);
        }

        if response.hits.hits.is_empty() {
            self.finish().await;
            return Ok(None);
        }
        Ok(Some(response.hits.hits))
    }

    async fn finish(&mut self) {
        if let Some(scroll_id) = self.scroll_id.take() {
            self.client.clear_scroll(&scroll_id).await;
        }
    }
}
