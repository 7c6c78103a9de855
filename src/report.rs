//! Human-readable summaries printed during an interactive review.

use std::fmt;

use crate::search::{Hit, query};

/// Maximum number of characters of a message body shown in a preview.
pub const PREVIEW_CHARS: usize = 50;

/// One line describing a matched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub from_user: String,
    pub to_user: String,
    pub date: String,
    /// `Some` when content was requested, even if neither the body nor the
    /// deleted-by marker was stored (then it is empty).
    pub preview: Option<String>,
}

impl MessageSummary {
    pub fn from_hit(hit: &Hit, include_content: bool) -> Self {
        let preview = include_content.then(|| {
            match hit.first_field(query::FIELD_BODY) {
                Some(body) => truncate_chars(&body, PREVIEW_CHARS).to_string(),
                None => hit
                    .first_field(query::FIELD_DELETED_BY)
                    .map(|user_id| format!("[Message deleted from user_id {user_id}]"))
                    .unwrap_or_default(),
            }
        });

        Self {
            from_user: hit.first_field(query::FIELD_FROM_USER).unwrap_or_default(),
            to_user: hit.first_field(query::FIELD_TO_USER).unwrap_or_default(),
            date: hit
                .first_field(query::FIELD_DATE)
                .map(|d| display_date(&d).to_string())
                .unwrap_or_default(),
            preview,
        }
    }
}

impl fmt::Display for MessageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message from user_id {} to user_id {}, date {}",
            self.from_user, self.to_user, self.date
        )?;
        if let Some(preview) = &self.preview {
            write!(f, ": {preview}")?;
        }
        Ok(())
    }
}

/// Strip the timezone suffix from an indexed timestamp for readability:
/// `2016-05-04T07:13:48.123Z` becomes `2016-05-04T07:13:48.123`.
fn display_date(raw: &str) -> &str {
    match raw.find('Z') {
        Some(pos) => &raw[..pos],
        None => raw,
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((pos, _)) => &s[..pos],
        None => s,
    }
}
