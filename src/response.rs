//! Decoded shapes for list and batch payloads.

use serde_json::Value;

/// One page of a list query: the items plus the opaque continuation marker
/// for the following page, when the backend believes there is one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_token: Option<String>,
}

impl Page {
    /// Decode a list-operation payload. Absent or non-array `items` decodes
    /// to an empty page; an absent or non-string `nextToken` means the source
    /// is exhausted.
    pub fn from_payload(payload: &Value) -> Page {
        let items = payload
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let next_token = payload
            .get("nextToken")
            .and_then(Value::as_str)
            .map(str::to_string);
        Page { items, next_token }
    }
}

/// Outcome of a batch-by-ID fetch. A batch may resolve fewer items than it
/// requested; the IDs the backend could not retrieve are surfaced here rather
/// than silently dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchFetchResult {
    pub items: Vec<Value>,
    pub unretrieved_ids: Vec<String>,
}

impl BatchFetchResult {
    pub fn from_payload(payload: &Value) -> BatchFetchResult {
        let items = payload
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let unretrieved_ids = payload
            .get("unretrievedItems")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        BatchFetchResult {
            items,
            unretrieved_ids,
        }
    }
}
