use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Value, json};

/// One matched document, as returned by a stored-fields search.
///
/// Stored-fields hits carry no `_source`; every requested field comes back
/// under `fields` as an array of values, even when single-valued.
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub fields: HashMap<String, Vec<Value>>,
}

impl Hit {
    /// First value of a stored field, rendered as a string.
    pub fn first_field(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(|v| v.first()).map(render)
    }

    /// All values of a stored field, rendered as strings.
    pub fn field_values(&self, name: &str) -> impl Iterator<Item = String> + '_ {
        self.fields
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or_default()
            .iter()
            .map(render)
    }
}

/// User ids may be indexed as strings or numbers; either way they are
/// rendered without JSON quoting.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Identifies one stored document precisely enough to delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDescriptor {
    pub index: String,
    pub doc_type: String,
    pub id: String,
}

impl DeleteDescriptor {
    pub fn from_hit(hit: &Hit) -> Self {
        Self {
            index: hit.index.clone(),
            doc_type: hit.doc_type.clone(),
            id: hit.id.clone(),
        }
    }

    /// The action line this descriptor contributes to a bulk request body.
    pub fn bulk_action(&self) -> Value {
        json!({ "delete": {
            "_index": self.index,
            "_type": self.doc_type,
            "_id": self.id,
        } })
    }
}

/// One page of a scrolled search.
#[derive(Debug, Deserialize)]
pub struct ScrollResponse {
    #[serde(rename = "_scroll_id")]
    pub scroll_id: Option<String>,
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    pub hits: Vec<Hit>,
}

/// Result of a bulk request. Items are kept loosely typed; the tool only
/// counts failures for the debug log and never acts on them.
#[derive(Debug, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<Value>,
}

impl BulkResponse {
    /// Number of delete actions the backend rejected.
    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter_map(|item| item.get("delete").and_then(|d| d.get("status")))
            .filter_map(Value::as_u64)
            .filter(|status| *status >= 300)
            .count()
    }
}
