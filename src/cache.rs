//! Result caching keyed on the literal query signature.
//!
//! A cache hit must be semantically equivalent to the payload the backend
//! would return for the identical request, so keys are the exact
//! `(text, variables)` identity from [`QueryDocument::cache_key`]; the
//! engine never reads across differing bindings, cursors included.
//! Cursor-independent de-duplication is a separate, explicit step
//! ([`QueryDocument::normalized_for_cache`]).
//!
//! [`QueryDocument::cache_key`]: crate::document::QueryDocument::cache_key
//! [`QueryDocument::normalized_for_cache`]: crate::document::QueryDocument::normalized_for_cache

use crate::response::Page;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Read/write boundary the execution engine consults. Lookups are
/// synchronous by contract; suspension only ever happens at the transport.
///
/// The store is append-mostly: distinct request shapes have distinct keys, so
/// legitimate concurrent use never writes the same key with different values.
/// Eviction and lifetime are the owner's concern, not the engine's.
pub trait QueryCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, payload: Value);
}

/// In-memory `QueryCache` behind a read/write lock.
#[derive(Debug, Default)]
pub struct MemoryQueryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl QueryCache for MemoryQueryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn put(&self, key: &str, payload: Value) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), payload);
        }
    }
}

/// A page reduced to its item IDs plus cursor, for callers that keep items in
/// a per-type item cache and only want to remember page membership.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedPage {
    pub ids: Vec<String>,
    pub next_token: Option<String>,
}

impl CompressedPage {
    pub fn from_page(page: &Page) -> CompressedPage {
        let ids = page
            .items
            .iter()
            .filter_map(|item| item.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        CompressedPage {
            ids,
            next_token: page.next_token.clone(),
        }
    }

    /// Rebuild a page by resolving each remembered ID through `lookup`.
    /// IDs that no longer resolve are skipped.
    pub fn expand<F>(&self, lookup: F) -> Page
    where
        F: Fn(&str) -> Option<Value>,
    {
        let items = self.ids.iter().filter_map(|id| lookup(id)).collect();
        Page {
            items,
            next_token: self.next_token.clone(),
        }
    }
}
