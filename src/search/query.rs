//! Query construction for the private message filter.
//!
//! Messages are stored with flattened sender/recipient fields; the filter
//! matches the (A,B) pair in either direction. Fields are requested as
//! stored fields, so every value in a hit comes back as an array.

use serde_json::{Value, json};

pub const FIELD_FROM_USER: &str = "from.user_id";
pub const FIELD_TO_USER: &str = "to.user_id";
pub const FIELD_DATE: &str = "date";
pub const FIELD_CHAT_ID: &str = "privatechat_id";
pub const FIELD_BODY: &str = "stanza_data.body";
pub const FIELD_DELETED_BY: &str = "deleted.user_id";

/// Immutable selection of all private messages between two users.
///
/// Built once at startup from operator-supplied user ids; `include_content`
/// additionally requests the message body and the deleted-by marker so the
/// operator can review what is about to be removed.
#[derive(Debug, Clone)]
pub struct ConversationFilter {
    user_a: String,
    user_b: String,
    include_content: bool,
}

impl ConversationFilter {
    pub fn new(
        user_a: impl Into<String>,
        user_b: impl Into<String>,
        include_content: bool,
    ) -> Self {
        Self {
            user_a: user_a.into(),
            user_b: user_b.into(),
            include_content,
        }
    }

    pub fn include_content(&self) -> bool {
        self.include_content
    }

    /// Build the filtered query sent to the search backend.
    pub fn to_query(&self) -> Value {
        let pair = |from: &str, to: &str| {
            json!({ "bool": { "must": [
                { "term": { "from.user_id": from } },
                { "term": { "to.user_id": to } },
            ] } })
        };

        let mut fields = vec![FIELD_FROM_USER, FIELD_TO_USER, FIELD_DATE, FIELD_CHAT_ID];
        if self.include_content {
            fields.push(FIELD_BODY);
            fields.push(FIELD_DELETED_BY);
        }

        json!({
            "fields": fields,
            "query": { "filtered": { "filter": { "bool": { "should": [
                pair(&self.user_a, &self.user_b),
                pair(&self.user_b, &self.user_a),
            ] } } } }
        })
    }
}
