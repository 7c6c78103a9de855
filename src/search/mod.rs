mod client;
mod error;
pub mod query;
mod types;

pub use client::SearchClient;
pub use error::{SearchError, SearchResult};
pub use query::ConversationFilter;
pub use types::{BulkResponse, DeleteDescriptor, Hit};
