/// History cache key for one private chat: `{prefix}{chat_id}`.
pub fn history_key(prefix: &str, chat_id: &str) -> String {
    format!("{prefix}{chat_id}")
}
