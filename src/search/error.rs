use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Search backend returned {status}: {body}")]
    Backend {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unexpected response from search backend: {0}")]
    InvalidResponse(String),
}

pub type SearchResult<T> = Result<T, SearchError>;
